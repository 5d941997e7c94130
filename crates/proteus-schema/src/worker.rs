use std::{panic, thread};

/// Apply `f` to every item, one scoped thread per item when `parallel` is set.
/// Results come back in input order either way.
pub(crate) fn fan_out<T, R, F>(items: Vec<T>, parallel: bool, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    if !parallel || items.len() < 2 {
        return items.into_iter().map(f).collect();
    }

    let f = &f;
    thread::scope(|scope| {
        let handles: Vec<_> = items
            .into_iter()
            .map(|item| scope.spawn(move || f(item)))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| panic::resume_unwind(payload))
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_results_keep_input_order() {
        let items: Vec<u64> = (0..16).collect();

        let out = fan_out(items, true, |n| {
            thread::sleep(std::time::Duration::from_millis(16 - n));
            n * 2
        });

        assert_eq!(out, (0..16).map(|n| n * 2).collect::<Vec<_>>());
    }

    #[test]
    fn sequential_mode_matches_parallel_mode() {
        let words = vec!["alpha", "beta", "gamma"];

        let seq = fan_out(words.clone(), false, str::len);
        let par = fan_out(words, true, str::len);

        assert_eq!(seq, par);
    }
}

#[macro_export]
macro_rules! wrapper {
    // Single expression (like a function name or closure)
    ($f:expr) => {{
        $f()
    }};
    ($f:expr, $( $args:expr $(,)? )* ) => {{
        $f( $($args,)* )
    }};
}

/// Calls the wrapped function until it succeeds or the policy's retries are spent.
/// Evaluates to the result of the last attempt.
#[macro_export]
macro_rules! retry {
    ($policy:expr, $step:expr, $( $args:expr$(,)? )+) => {{
        let policy: $crate::models::RetryPolicy = $policy;
        let mut attempt: u32 = 1;
        loop {
            let res = $crate::wrapper!($( $args, )*);
            if res.is_ok() || attempt > policy.retries {
                break res;
            }
            if let Err(e) = &res {
                log::warn!("{} attempt {} failed: {}, retrying in {}s", $step, attempt, e, policy.delay.as_secs());
            }
            std::thread::sleep(policy.delay);
            attempt += 1;
        }
    }};
}

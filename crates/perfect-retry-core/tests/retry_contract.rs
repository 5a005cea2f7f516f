//! Integration tests: observable behaviour of the retry loop through the
//! public API, using a capturing sink instead of a logger.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use perfect_retry_core::retry::delay;
use perfect_retry_core::{CancelToken, Limit, Policy, Retrier, RetryError, RetryEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Failure {
    Standard(String),
    Stop(String),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Standard(msg) | Failure::Stop(msg) => f.write_str(msg),
        }
    }
}

#[derive(Debug, Clone)]
struct Report {
    attempt: u32,
    limit: Limit,
    message: String,
}

type Reports = Arc<Mutex<Vec<Report>>>;

fn policy(limit: Limit) -> (Policy<Failure>, Reports, Arc<Mutex<Vec<u32>>>) {
    let reports: Reports = Arc::default();
    let delays: Arc<Mutex<Vec<u32>>> = Arc::default();
    let sink = {
        let reports = Arc::clone(&reports);
        move |ev: &RetryEvent<'_>| {
            reports.lock().unwrap().push(Report {
                attempt: ev.attempt,
                limit: ev.limit,
                message: ev.message.clone(),
            })
        }
    };
    let delay = {
        let delays = Arc::clone(&delays);
        move |attempt: u32| {
            delays.lock().unwrap().push(attempt);
            Duration::ZERO
        }
    };
    let policy = Policy::builder()
        .limit(limit)
        .delay(delay)
        .sink(sink)
        .retry_if(|f: &Failure| matches!(f, Failure::Standard(_)))
        .build()
        .unwrap();
    (policy, reports, delays)
}

#[test]
fn success_passes_through_without_reports() {
    let (policy, reports, delays) = policy(Limit::Finite(5));
    let ret = Retrier::new(policy).execute(|_| Ok::<_, Failure>(vec![1, 2, 3]));
    assert_eq!(ret.unwrap(), vec![1, 2, 3]);
    assert!(reports.lock().unwrap().is_empty());
    assert!(delays.lock().unwrap().is_empty());
}

#[test]
fn finite_limit_reports_each_retry_then_exhausts() {
    let (policy, reports, delays) = policy(Limit::Finite(5));
    let mut calls = 0u32;
    let err = Retrier::new(policy)
        .execute(|_| -> Result<(), Failure> {
            calls += 1;
            Err(Failure::Standard("ERROR!!".to_string()))
        })
        .unwrap_err();

    match &err {
        RetryError::Exhausted { last, attempts } => {
            assert_eq!(*last, Failure::Standard("ERROR!!".to_string()));
            assert_eq!(*attempts, 6);
        }
        other => panic!("expected Exhausted, got {:?}", other),
    }
    assert_eq!(calls, 6);

    let reports = reports.lock().unwrap();
    let indices: Vec<u32> = reports.iter().map(|r| r.attempt).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    for r in reports.iter() {
        assert_eq!(r.limit, Limit::Finite(5));
        assert!(r.message.contains(&format!("[{}/5]", r.attempt)), "{}", r.message);
        assert!(r.message.contains("ERROR!!"));
        assert!(r.message.contains("Failure"));
        assert!(r.message.contains("Retrying"));
    }

    // One delay per retried attempt, none after the exhausting one.
    assert_eq!(*delays.lock().unwrap(), vec![1, 2, 3, 4, 5]);
}

#[test]
fn exhausting_attempt_is_not_reported() {
    let (policy, reports, _) = policy(Limit::Finite(1));
    let err = Retrier::new(policy)
        .execute(|attempt| -> Result<(), Failure> {
            Err(Failure::Standard(format!("fail {}", attempt)))
        })
        .unwrap_err();
    assert!(err.is_exhausted());
    assert_eq!(*err.last_failure(), Failure::Standard("fail 2".to_string()));
    let reports = reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("fail 1"));
}

#[test]
fn fatal_bypasses_loop_regardless_of_limit() {
    for limit in [Limit::Finite(1), Limit::Finite(100), Limit::Unlimited] {
        let (policy, reports, delays) = policy(limit);
        let mut calls = 0;
        let err = Retrier::new(policy)
            .execute(|_| -> Result<(), Failure> {
                calls += 1;
                Err(Failure::Stop("stop".to_string()))
            })
            .unwrap_err();
        match err {
            RetryError::Fatal(f) => assert_eq!(f, Failure::Stop("stop".to_string())),
            other => panic!("expected Fatal, got {:?}", other),
        }
        assert_eq!(calls, 1);
        assert!(reports.lock().unwrap().is_empty());
        assert!(delays.lock().unwrap().is_empty());
    }
}

#[test]
fn unlimited_runs_past_any_bound_until_fatal() {
    let (policy, reports, _) = policy(Limit::Unlimited);
    let err = Retrier::new(policy)
        .execute(|times| -> Result<(), Failure> {
            if times < 10 {
                Err(Failure::Standard("foo".to_string()))
            } else {
                Err(Failure::Stop("stop".to_string()))
            }
        })
        .unwrap_err();
    assert_eq!(err.into_inner(), Failure::Stop("stop".to_string()));

    let reports = reports.lock().unwrap();
    let indices: Vec<u32> = reports.iter().map(|r| r.attempt).collect();
    assert_eq!(indices, (1..10).collect::<Vec<_>>());
    for r in reports.iter() {
        assert_eq!(r.limit, Limit::Unlimited);
        assert!(r.message.contains(&format!("[{}/Infinity]", r.attempt)));
        assert!(r.message.contains("foo"));
    }
}

#[test]
fn unlimited_continues_until_success() {
    let (policy, reports, _) = policy(Limit::Unlimited);
    let ret = Retrier::new(policy).execute(|times| {
        if times <= 250 {
            Err(Failure::Standard("not yet".to_string()))
        } else {
            Ok(times)
        }
    });
    assert_eq!(ret.unwrap(), 251);
    assert_eq!(reports.lock().unwrap().len(), 250);
}

#[test]
fn shared_policy_across_threads() {
    let (policy, reports, _) = policy(Limit::Finite(3));
    let retrier = Retrier::new(policy);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let retrier = retrier.clone();
            thread::spawn(move || {
                retrier.execute(|attempt| {
                    if attempt < 3 {
                        Err(Failure::Standard("busy".to_string()))
                    } else {
                        Ok(attempt)
                    }
                })
            })
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap().unwrap(), 3);
    }
    // Two retried failures per thread.
    assert_eq!(reports.lock().unwrap().len(), 8);
}

#[test]
fn cancel_interrupts_the_delay() {
    let reports: Reports = Arc::default();
    let sink = {
        let reports = Arc::clone(&reports);
        move |ev: &RetryEvent<'_>| {
            reports.lock().unwrap().push(Report {
                attempt: ev.attempt,
                limit: ev.limit,
                message: ev.message.clone(),
            })
        }
    };
    let policy = Policy::<Failure>::builder()
        .unlimited()
        .delay(delay::constant(Duration::from_secs(60)))
        .sink(sink)
        .build()
        .unwrap();
    let token = CancelToken::new();
    let retrier = Retrier::new(policy).with_cancel(token.clone());

    let start = Instant::now();
    let worker = thread::spawn(move || {
        retrier.execute(|_| -> Result<(), Failure> { Err(Failure::Standard("down".to_string())) })
    });
    thread::sleep(Duration::from_millis(50));
    token.cancel();

    let err = worker.join().unwrap().unwrap_err();
    assert!(start.elapsed() < Duration::from_secs(30));
    match err {
        RetryError::Cancelled { last, attempts } => {
            assert_eq!(last, Failure::Standard("down".to_string()));
            assert_eq!(attempts, 1);
        }
        other => panic!("expected Cancelled, got {:?}", other),
    }
    assert_eq!(reports.lock().unwrap().len(), 1);
}

#[test]
#[should_panic(expected = "sink failed")]
fn sink_panic_propagates() {
    let policy = Policy::<Failure>::builder()
        .delay(delay::none())
        .sink(|_: &RetryEvent<'_>| panic!("sink failed"))
        .build()
        .unwrap();
    let _ = Retrier::new(policy).execute(|_| -> Result<(), Failure> {
        Err(Failure::Standard("x".to_string()))
    });
}

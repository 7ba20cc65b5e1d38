use std::fmt;

use parking_lot::Mutex;
use tokio::sync::Notify;

type Continuation<T> = Box<dyn FnOnce(&T) + Send>;

enum Settlement<T> {
    Pending,
    Settling,
    Settled(T),
}

struct DeferredInner<T> {
    settlement: Settlement<T>,
    continuations: Vec<Continuation<T>>,
}

/// 单次结算的异步门
///
/// 第一次 `complete` 生效，之后的调用全部被忽略（不会报错，也不会改变已保存的值）。
/// 通过 `on_settled` 注册的回调在获胜的 `complete` 调用内同步执行；
/// 回调全部执行完之后值才对 `value`/`is_settled`/`wait` 可见。
pub struct Deferred<T> {
    inner: Mutex<DeferredInner<T>>,
    notify: Notify,
}

impl<T> Deferred<T>
where
    T: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(DeferredInner {
                settlement: Settlement::Pending,
                continuations: Vec::new(),
            }),
            notify: Notify::new(),
        }
    }

    /// Returns `true` only for the call that settled the gate.
    pub fn complete(&self, value: T) -> bool {
        let mut continuations = {
            let mut inner = self.inner.lock();
            if !matches!(inner.settlement, Settlement::Pending) {
                return false;
            }
            inner.settlement = Settlement::Settling;
            std::mem::take(&mut inner.continuations)
        };

        // 回调执行期间注册的新回调也在发布前执行完
        loop {
            for continuation in continuations.drain(..) {
                continuation(&value);
            }
            let mut inner = self.inner.lock();
            if inner.continuations.is_empty() {
                inner.settlement = Settlement::Settled(value);
                break;
            }
            continuations = std::mem::take(&mut inner.continuations);
        }

        self.notify.notify_waiters();
        true
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.inner.lock().settlement, Settlement::Settled(_))
    }

    pub fn value(&self) -> Option<T> {
        match &self.inner.lock().settlement {
            Settlement::Settled(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// 注册一次性回调；若已结算则立即执行。
    pub fn on_settled(&self, continuation: impl FnOnce(&T) + Send + 'static) {
        let settled = {
            let mut inner = self.inner.lock();
            match &inner.settlement {
                Settlement::Settled(value) => value.clone(),
                _ => {
                    inner.continuations.push(Box::new(continuation));
                    return;
                }
            }
        };
        continuation(&settled);
    }

    pub async fn wait(&self) -> T {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if let Some(value) = self.value() {
                return value;
            }
            notified.await;
        }
    }
}

impl<T> Default for Deferred<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        let value = match &inner.settlement {
            Settlement::Settled(value) => Some(value),
            _ => None,
        };
        f.debug_struct("Deferred")
            .field("value", &value)
            .field("pending_continuations", &inner.continuations.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn first_completion_wins() {
        let gate = Deferred::new();
        assert!(!gate.is_settled());
        assert!(gate.complete(true));
        assert!(!gate.complete(false));
        assert_eq!(gate.value(), Some(true));
    }

    #[test]
    fn continuations_run_once() {
        let gate = Deferred::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        gate.on_settled(move |value: &u32| {
            assert_eq!(*value, 7);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        gate.complete(7);
        gate.complete(8);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn late_continuation_runs_immediately() {
        let gate = Deferred::<String>::new();
        gate.complete("done".to_string());

        let seen = Arc::new(parking_lot::Mutex::new(None));
        let slot = Arc::clone(&seen);
        gate.on_settled(move |value: &String| {
            *slot.lock() = Some(value.clone());
        });
        assert_eq!(seen.lock().as_deref(), Some("done"));
    }

    #[test]
    fn gate_is_unsettled_while_continuations_run() {
        let gate = Arc::new(Deferred::<bool>::new());
        let observed = Arc::new(parking_lot::Mutex::new(None));
        {
            let gate_ref = Arc::clone(&gate);
            let slot = Arc::clone(&observed);
            gate.on_settled(move |_| {
                let during = (
                    gate_ref.is_settled(),
                    gate_ref.value(),
                    gate_ref.complete(false),
                );
                *slot.lock() = Some(during);
            });
        }

        assert!(gate.complete(true));
        assert_eq!(*observed.lock(), Some((false, None, false)));
        assert_eq!(gate.value(), Some(true));
    }

    #[test]
    fn continuation_registered_while_settling_runs_before_publish() {
        let gate = Arc::new(Deferred::<u32>::new());
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        {
            let gate_ref = Arc::clone(&gate);
            let outer = Arc::clone(&order);
            gate.on_settled(move |value| {
                outer.lock().push(format!("first:{value}"));
                let inner = Arc::clone(&outer);
                let gate_check = Arc::clone(&gate_ref);
                gate_ref.on_settled(move |value| {
                    inner
                        .lock()
                        .push(format!("nested:{value}:{}", gate_check.is_settled()));
                });
            });
        }

        gate.complete(3);
        assert_eq!(
            *order.lock(),
            vec!["first:3".to_string(), "nested:3:false".to_string()]
        );
    }

    #[tokio::test]
    async fn wait_resolves_after_complete() {
        let gate = Arc::new(Deferred::<bool>::new());
        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.wait().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        gate.complete(false);
        assert!(!waiter.await.expect("join"));
    }

    #[tokio::test]
    async fn wait_on_settled_gate_returns_immediately() {
        let gate = Deferred::<()>::new();
        gate.complete(());
        gate.wait().await;
    }
}

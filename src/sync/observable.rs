use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};
use tokio::sync::watch;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;
type ListenerList<T> = Mutex<Vec<(u64, Listener<T>)>>;

/// 可观察的值
///
/// 同步读取；每次写入后通知所有订阅者。异步消费者可通过 `watch` 获取接收端。
/// 写入与通知在同一把写锁内完成，订阅者按写入顺序收到值。
pub struct ObservableValue<T> {
    sender: watch::Sender<T>,
    write_lock: ReentrantMutex<()>,
    listeners: Arc<ListenerList<T>>,
    next_listener_id: AtomicU64,
}

impl<T> ObservableValue<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender,
            write_lock: ReentrantMutex::new(()),
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_listener_id: AtomicU64::new(1),
        }
    }

    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }

    pub fn set(&self, value: T) {
        let _writer = self.write_lock.lock();
        self.sender.send_replace(value.clone());
        self.notify(&value);
    }

    /// Read-modify-write under the cell's lock, so concurrent updates are never lost.
    pub fn update(&self, apply: impl FnOnce(&T) -> T) -> T {
        let _writer = self.write_lock.lock();
        let mut next = None;
        self.sender.send_modify(|current| {
            let value = apply(current);
            *current = value.clone();
            next = Some(value);
        });
        let value = match next {
            Some(value) => value,
            None => self.get(),
        };
        self.notify(&value);
        value
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, Arc::new(listener)));
        let weak: Weak<ListenerList<T>> = Arc::downgrade(&self.listeners);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(listeners) = weak.upgrade() {
                    listeners.lock().retain(|(entry, _)| *entry != id);
                }
            })),
        }
    }

    pub fn watch(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    fn notify(&self, value: &T) {
        let listeners: Vec<Listener<T>> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(value);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableValue")
            .field("value", &*self.sender.borrow())
            .field("listeners", &self.listeners.lock().len())
            .finish()
    }
}

/// 订阅句柄，drop 时自动取消订阅
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.detach_now();
    }

    fn detach_now(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}

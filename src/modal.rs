use log::debug;
use std::sync::atomic::{ AtomicU64, Ordering };
use std::sync::{ Arc, Mutex, MutexGuard };

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModalState {
    pub is_open: bool,
    pub agent_name: String,
    pub agent_icon: String,
}

type Listener = Arc<dyn Fn(&ModalState) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Open/closed state of the chat modal and the agent it shows. Shared by
/// reference (`Arc<ChatModalStore>`) with every view that needs it; each
/// change is pushed to all subscribers.
#[derive(Default)]
pub struct ChatModalStore {
    state: Mutex<ModalState>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ChatModalStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn state(&self) -> ModalState {
        lock(&self.state).clone()
    }

    pub fn open(&self, agent_name: &str, agent_icon: &str) {
        {
            let mut state = lock(&self.state);
            state.is_open = true;
            state.agent_name = agent_name.to_string();
            state.agent_icon = agent_icon.to_string();
        }
        debug!("Chat modal opened for agent '{}'", agent_name);
        self.notify();
    }

    /// Closes the modal; the last agent stays in the state.
    pub fn close(&self) {
        lock(&self.state).is_open = false;
        debug!("Chat modal closed");
        self.notify();
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId where F: Fn(&ModalState) + Send + Sync + 'static {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.listeners).push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        lock(&self.listeners).retain(|(sid, _)| *sid != id);
    }

    fn notify(&self) {
        let state = self.state();
        // Snapshot so a listener may (un)subscribe without deadlocking.
        let listeners: Vec<Listener> = lock(&self.listeners)
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(&state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn subscribers_see_every_change() {
        let store = ChatModalStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |s| sink.lock().unwrap().push(s.clone()));

        store.open("Atendente de Clínica", "fas fa-stethoscope");
        store.close();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].is_open);
        assert_eq!(seen[0].agent_name, "Atendente de Clínica");
        assert!(!seen[1].is_open);
        assert_eq!(seen[1].agent_name, "Atendente de Clínica");
    }

    #[test]
    fn unsubscribed_listeners_are_not_called() {
        let store = ChatModalStore::new();
        let count = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        let id = store.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        store.open("SDR", "fas fa-user");
        store.unsubscribe(id);
        store.close();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listener_may_unsubscribe_itself() {
        let store = ChatModalStore::new();
        let inner = store.clone();
        let id = Arc::new(Mutex::new(None));
        let slot = id.clone();
        let sid = store.subscribe(move |_| {
            if let Some(sid) = *slot.lock().unwrap() {
                inner.unsubscribe(sid);
            }
        });
        *id.lock().unwrap() = Some(sid);
        store.open("SDR", "fas fa-user");
        store.close();
        assert!(!store.state().is_open);
    }
}

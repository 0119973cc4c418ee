use std::any::{TypeId, type_name};
use std::collections::{BTreeMap, VecDeque};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use flume::{Receiver, Sender};
use log::{error, warn};
use tokio_util::sync::CancellationToken;

use crate::graph::{Graph, TopologyError};
use crate::updater::Update;
use crate::{
    Command, CommandFuture, CommandSnapshot, Compute, Dep, LatestOnlyUpdater, State,
    StateSyncStatus, TaskHandle, TaskId, Updater,
};

pub(crate) struct StateSlot {
    pub(crate) name: &'static str,
    pub(crate) value: Box<dyn State>,
}

pub(crate) struct ComputeSlot {
    pub(crate) name: &'static str,
    pub(crate) value: Box<dyn Compute>,
    pub(crate) status: StateSyncStatus,
}

/// Owner of every state, compute and command of one view.
///
/// The UI thread drives it once per frame:
/// 1. `sync_computes` applies what async commands sent through their updaters
/// 2. the frame reads `state` / `cached` and mutates states
/// 3. `run_computed` re-runs derived computes whose dependencies changed
///
/// Commands are queued with `enqueue_command` and spawned by `flush_commands`
/// (or both at once with `dispatch`).
pub struct StateCtx {
    states: BTreeMap<TypeId, StateSlot>,
    computes: BTreeMap<TypeId, ComputeSlot>,
    commands: BTreeMap<TypeId, Arc<dyn Command>>,
    command_queue: VecDeque<TypeId>,

    graph: Graph<TypeId>,
    order: Option<Vec<TypeId>>,

    send: Sender<Update>,
    recv: Receiver<Update>,

    generation: u64,
    root_cancel: CancellationToken,
    // latest run of each superseding command
    running: BTreeMap<TypeId, TaskHandle>,

    #[cfg(not(target_arch = "wasm32"))]
    tasks: tokio::task::JoinSet<()>,
    #[cfg(target_arch = "wasm32")]
    in_flight: Arc<std::sync::atomic::AtomicUsize>,
}

impl Default for StateCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for StateCtx {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateCtx")
            .field(
                "states",
                &self.states.values().map(|s| s.name).collect::<Vec<_>>(),
            )
            .field(
                "computes",
                &self
                    .computes
                    .values()
                    .map(|c| (c.name, c.status))
                    .collect::<Vec<_>>(),
            )
            .field("commands", &self.commands.len())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl StateCtx {
    pub fn new() -> Self {
        let (send, recv) = flume::unbounded();
        Self {
            states: BTreeMap::new(),
            computes: BTreeMap::new(),
            commands: BTreeMap::new(),
            command_queue: VecDeque::new(),
            graph: Graph::new(),
            order: None,
            send,
            recv,
            generation: 0,
            root_cancel: CancellationToken::new(),
            running: BTreeMap::new(),
            #[cfg(not(target_arch = "wasm32"))]
            tasks: tokio::task::JoinSet::new(),
            #[cfg(target_arch = "wasm32")]
            in_flight: Arc::default(),
        }
    }

    pub fn add_state<T: State>(&mut self, state: T) {
        let id = TypeId::of::<T>();
        self.states.insert(
            id,
            StateSlot {
                name: type_name::<T>(),
                value: Box::new(state),
            },
        );
        self.mark_dependents_dirty(id);
    }

    pub fn record_compute<T: Compute>(&mut self, compute: T) {
        let id = TypeId::of::<T>();
        let (state_ids, compute_ids) = compute.deps();

        self.graph.add_node(id);
        for dep in state_ids.into_iter().chain(compute_ids) {
            self.graph.route_to(dep, id, ());
        }
        self.order = None;

        self.computes.insert(
            id,
            ComputeSlot {
                name: type_name::<T>(),
                value: Box::new(compute),
                status: StateSyncStatus::Init,
            },
        );
    }

    pub fn record_command<T: Command>(&mut self, command: T) {
        self.commands.insert(TypeId::of::<T>(), Arc::new(command));
    }

    pub fn try_state<T: State>(&self) -> Option<&T> {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.value.as_any().downcast_ref::<T>())
    }

    /// # Panics
    /// Panics if `T` was never added.
    pub fn state<T: State>(&self) -> &T {
        self.try_state::<T>()
            .unwrap_or_else(|| panic!("State {} is not registered", type_name::<T>()))
    }

    /// Mutable access to a state. Computes depending on it are marked dirty.
    ///
    /// # Panics
    /// Panics if `T` was never added.
    pub fn state_mut<T: State>(&mut self) -> &mut T {
        let id = TypeId::of::<T>();
        self.mark_dependents_dirty(id);
        self.states
            .get_mut(&id)
            .and_then(|slot| slot.value.as_any_mut().downcast_mut::<T>())
            .unwrap_or_else(|| panic!("State {} is not registered", type_name::<T>()))
    }

    pub fn update<T: State>(&mut self, f: impl FnOnce(&mut T)) {
        f(self.state_mut::<T>());
    }

    pub fn cached<T: Compute>(&self) -> Option<&T> {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.value.as_any().downcast_ref::<T>())
    }

    /// # Panics
    /// Panics if `T` was never recorded.
    pub fn compute<T: Compute>(&self) -> &T {
        self.cached::<T>()
            .unwrap_or_else(|| panic!("Compute {} is not registered", type_name::<T>()))
    }

    pub fn updater(&self) -> Updater {
        Updater::new(self.send.clone())
    }

    /// Apply every queued update and reap finished tasks.
    pub fn sync_computes(&mut self) {
        #[cfg(not(target_arch = "wasm32"))]
        while let Some(joined) = self.tasks.try_join_next() {
            if let Err(err) = joined
                && err.is_panic()
            {
                error!("Command task panicked: {err}");
            }
        }

        self.drain_updates();
    }

    /// Re-run dirty computes in dependency order.
    pub fn run_computed(&mut self) {
        for id in self.compute_order() {
            let Some(slot) = self.computes.get(&id) else {
                continue;
            };
            if !slot.status.needs_compute() {
                continue;
            }

            slot.value
                .compute(Dep::new(&self.states, &self.computes), self.updater());

            if let Some(slot) = self.computes.get_mut(&id) {
                slot.status = StateSyncStatus::Clean;
            }
            // later computes in the order must see this result
            self.drain_updates();
        }
    }

    pub fn verify_deps(&mut self) -> Result<(), TopologyError<TypeId>> {
        let order = self.graph.topology_sort()?;
        self.order = Some(order);
        Ok(())
    }

    pub fn enqueue_command<T: Command>(&mut self) {
        let id = TypeId::of::<T>();
        if self.commands.contains_key(&id) {
            self.command_queue.push_back(id);
        } else {
            warn!("Command {} is not registered, ignored", type_name::<T>());
        }
    }

    pub fn dispatch<T: Command>(&mut self) {
        self.enqueue_command::<T>();
        self.flush_commands();
    }

    pub fn flush_commands(&mut self) {
        while let Some(id) = self.command_queue.pop_front() {
            self.spawn_command(id);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    #[cfg(target_arch = "wasm32")]
    pub fn task_count(&self) -> usize {
        self.in_flight.load(std::sync::atomic::Ordering::Acquire)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn task_set_mut(&mut self) -> &mut tokio::task::JoinSet<()> {
        &mut self.tasks
    }

    /// Cancel every task and, on native, wait for them to stop.
    pub async fn shutdown(&mut self) {
        self.root_cancel.cancel();
        self.running.clear();
        #[cfg(not(target_arch = "wasm32"))]
        self.tasks.shutdown().await;
    }

    fn spawn_command(&mut self, id: TypeId) {
        let Some(command) = self.commands.get(&id).map(Arc::clone) else {
            return;
        };

        self.generation += 1;
        let handle = TaskHandle::new(
            TaskId::new(id, self.generation),
            self.root_cancel.child_token(),
        );
        if command.supersedes_previous()
            && let Some(previous) = self.running.insert(id, handle.clone())
        {
            previous.cancel();
        }

        let updater = LatestOnlyUpdater::new(self.updater(), handle.cancellation_token());
        let future = command.run(self.snapshot(), updater, handle.cancellation_token());
        self.spawn(future);
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn spawn(&mut self, future: CommandFuture) {
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                self.tasks.spawn_on(future, &runtime);
            }
            Err(err) => error!("Cannot spawn command outside a tokio runtime: {err}"),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn spawn(&mut self, future: CommandFuture) {
        use std::sync::atomic::Ordering;

        let in_flight = Arc::clone(&self.in_flight);
        in_flight.fetch_add(1, Ordering::AcqRel);
        wasm_bindgen_futures::spawn_local(async move {
            future.await;
            in_flight.fetch_sub(1, Ordering::AcqRel);
        });
    }

    fn snapshot(&self) -> CommandSnapshot {
        let mut snap = CommandSnapshot::new();
        for (id, slot) in &self.states {
            if let Some(value) = slot.value.clone_boxed() {
                snap.insert_state(*id, value);
            }
        }
        for (id, slot) in &self.computes {
            if let Some(value) = slot.value.clone_boxed() {
                snap.insert_compute(*id, value);
            }
        }
        snap
    }

    fn compute_order(&mut self) -> Vec<TypeId> {
        if let Some(order) = &self.order {
            return order.clone();
        }
        let order = match self.graph.topology_sort() {
            Ok(order) => order,
            Err(err) => {
                error!("Invalid compute graph, falling back to registration order: {err}");
                self.computes.keys().copied().collect()
            }
        };
        self.order = Some(order.clone());
        order
    }

    fn drain_updates(&mut self) {
        while let Ok(update) = self.recv.try_recv() {
            self.apply(update);
        }
    }

    fn apply(&mut self, update: Update) {
        let id = match update {
            Update::Assign { id, name, value } => {
                if let Some(slot) = self.computes.get_mut(&id) {
                    slot.value.assign_box(value);
                } else if let Some(slot) = self.states.get_mut(&id) {
                    slot.value.assign_box(value);
                } else {
                    warn!("Update for unregistered {name} ignored");
                    return;
                }
                id
            }
            Update::Patch { id, name, patch } => {
                if let Some(slot) = self.computes.get_mut(&id) {
                    patch(slot.value.as_any_mut());
                } else if let Some(slot) = self.states.get_mut(&id) {
                    patch(slot.value.as_any_mut());
                } else {
                    warn!("Patch for unregistered {name} ignored");
                    return;
                }
                id
            }
        };
        self.mark_dependents_dirty(id);
    }

    fn mark_dependents_dirty(&mut self, id: TypeId) {
        let dependents: Vec<TypeId> = self.graph.connected(id).copied().collect();
        for dependent in dependents {
            if let Some(slot) = self.computes.get_mut(&dependent) {
                slot.status = StateSyncStatus::Dirty;
            }
        }
    }
}

impl Drop for StateCtx {
    fn drop(&mut self) {
        self.root_cancel.cancel();
    }
}

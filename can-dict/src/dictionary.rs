//! The variable registry and its access protocol.
//!
//! A [`Dictionary`] is constructed once at start-up and then shared by reference with every module
//! that registers or serves variables. Registration (`bind`, `add*`, hook and callback setup)
//! needs `&mut self`; once start-up is done, the bus-facing operations only need `&self` and can
//! run from any task, since all runtime-mutable state is atomic.
//!
//! Typical start-up:
//!
//! ```ignore
//! static WHEEL_DIAM: Variable = Variable::from_f32(0.7);
//!
//! let mut dict = Dictionary::new(clock);
//! dict.bind(ids::WHEEL_DIAM, &WHEEL_DIAM, 4, Access::READ_WRITE, SendInterval::Never)?;
//! dict.add_float(ids::MAX_SPEED, 25.0, Access::READ_WRITE, SendInterval::Never)?;
//! dict.on_write(ids::WHEEL_DIAM, on_wheel_changed)?;
//! ```

use log::{trace, warn};

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::hooks::{raw_getter, raw_setter, Getter, Setter, WriteCallback};
use crate::id::{VarId, VARIABLE_COUNT};
use crate::slot::{Access, SendInterval, Slot, Storage};
use crate::variable::{Value, Variable, MAX_LENGTH};

/// Default number of dictionary-owned storage cells.
pub const DEFAULT_OWNED_CAPACITY: usize = 16;

/// Fixed-capacity table of variables keyed by [`VarId`].
///
/// - `'m` is the lifetime of bound storage: every cell passed to [`bind`](Self::bind) must outlive
///   the dictionary.
/// - `C` supplies the millisecond timestamps used to gate autonomous publishing.
/// - `OWNED` is the size of the pool backing [`add`](Self::add) registrations.
pub struct Dictionary<'m, C, const OWNED: usize = DEFAULT_OWNED_CAPACITY> {
    clock: C,
    slots: [Slot<'m>; VARIABLE_COUNT],
    pool: [Variable; OWNED],
    pool_used: [bool; OWNED],
}

impl<'m, C: Clock> Dictionary<'m, C> {
    /// Empty dictionary with the default owned-storage pool.
    pub fn new(clock: C) -> Self {
        Self::with_owned_capacity(clock)
    }
}

impl<'m, C: Clock, const OWNED: usize> Dictionary<'m, C, OWNED> {
    /// Empty dictionary with an `OWNED`-cell storage pool.
    pub fn with_owned_capacity(clock: C) -> Self {
        Self {
            clock,
            slots: core::array::from_fn(|_| Slot::empty()),
            pool: core::array::from_fn(|_| Variable::zeroed()),
            pool_used: [false; OWNED],
        }
    }

    #[inline]
    pub fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }

    // ---------------------------------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------------------------------

    /// Register `id` against caller-owned storage.
    ///
    /// Fails without touching any state if `length > 8` or `id` is already registered. On success
    /// the slot gets the raw-copy hooks and its last-sent timestamp is set to now.
    pub fn bind(
        &mut self,
        id: VarId,
        memory: &'m Variable,
        length: u8,
        access: Access,
        send_interval: SendInterval,
    ) -> Result<()> {
        self.install(id, Storage::Bound(memory), length, access, send_interval)
            .inspect_err(|e| warn!("can-dict: bind {} rejected: {}", id, e))
    }

    /// Register `id` with storage taken from the dictionary's own pool, initialized from
    /// `default_value` through the slot's setter.
    ///
    /// Same failure conditions as [`bind`](Self::bind), plus [`Error::AllocationFailure`] when the
    /// pool is exhausted. Invalid lengths are rejected before a cell is taken, and a cell taken
    /// for a registration that then fails is returned to the pool.
    pub fn add(
        &mut self,
        id: VarId,
        length: u8,
        default_value: Value,
        access: Access,
        send_interval: SendInterval,
    ) -> Result<()> {
        self.add_owned(id, length, default_value, access, send_interval)
            .inspect_err(|e| warn!("can-dict: add {} rejected: {}", id, e))
    }

    /// [`add`](Self::add) for an integer of `length` bytes.
    pub fn add_int(
        &mut self,
        id: VarId,
        length: u8,
        default_value: i64,
        access: Access,
        send_interval: SendInterval,
    ) -> Result<()> {
        self.add(id, length, Value::from_i64(default_value), access, send_interval)
    }

    /// [`add`](Self::add) for a 4-byte IEEE-754 float.
    pub fn add_float(
        &mut self,
        id: VarId,
        default_value: f32,
        access: Access,
        send_interval: SendInterval,
    ) -> Result<()> {
        self.add(id, 4, Value::from_f32(default_value), access, send_interval)
    }

    fn add_owned(
        &mut self,
        id: VarId,
        length: u8,
        default_value: Value,
        access: Access,
        send_interval: SendInterval,
    ) -> Result<()> {
        self.check_free(id, length)?;

        let cell = self.allocate().ok_or(Error::AllocationFailure)?;
        if let Err(e) = self.install(id, Storage::Owned(cell), length, access, send_interval) {
            self.release(cell);
            return Err(e);
        }

        let setter = self.slots[id.index()].setter;
        setter(&self.pool[cell], length as usize, default_value.as_bytes());
        Ok(())
    }

    fn check_free(&self, id: VarId, length: u8) -> Result<()> {
        if length as usize > MAX_LENGTH {
            return Err(Error::CapacityExceeded);
        }
        if self.slots[id.index()].is_active() {
            return Err(Error::AlreadyActive);
        }
        Ok(())
    }

    fn install(
        &mut self,
        id: VarId,
        storage: Storage<'m>,
        length: u8,
        access: Access,
        send_interval: SendInterval,
    ) -> Result<()> {
        self.check_free(id, length)?;

        let now = self.clock.now_ms();
        let slot = &mut self.slots[id.index()];
        slot.storage = Some(storage);
        slot.length = length;
        slot.access = access;
        slot.setter = raw_setter;
        slot.getter = raw_getter;
        slot.send_interval = send_interval;
        slot.callbacks.clear();
        slot.mark_sent(now);

        trace!("can-dict: registered {} ({} bytes)", id, length);
        Ok(())
    }

    fn allocate(&mut self) -> Option<usize> {
        let cell = self.pool_used.iter().position(|used| !used)?;
        self.pool_used[cell] = true;
        self.pool[cell].set_raw(0);
        Some(cell)
    }

    fn release(&mut self, cell: usize) {
        self.pool_used[cell] = false;
    }

    /// Replace the slot's setter.
    pub fn set_setter(&mut self, id: VarId, setter: Setter) -> Result<()> {
        let slot = self.active_slot_mut(id)?;
        slot.setter = setter;
        Ok(())
    }

    /// Replace the slot's getter.
    pub fn set_getter(&mut self, id: VarId, getter: Getter) -> Result<()> {
        let slot = self.active_slot_mut(id)?;
        slot.getter = getter;
        Ok(())
    }

    /// Append a write observer. At most [`MAX_WRITE_CALLBACKS`](crate::MAX_WRITE_CALLBACKS) per
    /// slot; there is no way to remove one.
    pub fn on_write(&mut self, id: VarId, callback: WriteCallback) -> Result<()> {
        let slot = self.active_slot_mut(id)?;
        slot.callbacks
            .push(callback)
            .map_err(|_| Error::CapacityExceeded)
    }

    // ---------------------------------------------------------------------------------------------
    // Local access
    // ---------------------------------------------------------------------------------------------

    /// Direct handle to the variable's storage, for local code that wants to read or modify it
    /// alongside the dictionary.
    pub fn get(&self, id: VarId) -> Option<&Variable> {
        let storage = self.slots[id.index()].storage?;
        Some(self.cell(storage))
    }

    #[inline]
    pub fn is_active(&self, id: VarId) -> bool {
        self.slots[id.index()].is_active()
    }

    /// Declared length, `None` if not registered.
    pub fn length(&self, id: VarId) -> Option<u8> {
        self.active_slot(id).ok().map(|slot| slot.length)
    }

    pub fn access(&self, id: VarId) -> Option<Access> {
        self.active_slot(id).ok().map(|slot| slot.access)
    }

    pub fn send_interval(&self, id: VarId) -> Option<SendInterval> {
        self.active_slot(id).ok().map(|slot| slot.send_interval)
    }

    /// Timestamp of the last successful read of `id`.
    pub fn last_sent_at(&self, id: VarId) -> Option<u32> {
        self.active_slot(id).ok().map(|slot| slot.last_sent_at())
    }

    /// Registered IDs in ascending order.
    pub fn active_ids(&self) -> impl Iterator<Item = VarId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_active())
            .filter_map(|(index, _)| VarId::new(index as u8))
    }

    /// Number of owned-pool cells currently backing a registration.
    pub fn owned_in_use(&self) -> usize {
        self.pool_used.iter().filter(|used| **used).count()
    }

    // ---------------------------------------------------------------------------------------------
    // Remote access
    // ---------------------------------------------------------------------------------------------

    /// Serve a read: copy up to `min(length, out.len())` bytes through the slot's getter and stamp
    /// the last-sent time.
    pub fn read(&self, id: VarId, out: &mut [u8]) -> Result<usize> {
        let slot = self.active_slot(id)?;
        if !slot.access.readable {
            return Err(Error::AccessDenied);
        }
        let storage = slot.storage.ok_or(Error::NotFound)?;

        let written = (slot.getter)(self.cell(storage), slot.length as usize, out);
        slot.mark_sent(self.clock.now_ms());
        Ok(written.min(out.len()).min(slot.length as usize))
    }

    /// Serve a write: store `min(length, payload.len())` bytes through the slot's setter, then call
    /// every write callback in registration order with the same copy of the new value.
    pub fn write(&self, id: VarId, payload: &[u8]) -> Result<()> {
        let slot = self.active_slot(id)?;
        if !slot.access.writable {
            return Err(Error::AccessDenied);
        }
        let storage = slot.storage.ok_or(Error::NotFound)?;
        let cell = self.cell(storage);

        let n = (slot.length as usize).min(payload.len());
        (slot.setter)(cell, slot.length as usize, &payload[..n]);

        let value = Value::snapshot(cell, slot.length);
        for callback in slot.callbacks.iter() {
            callback(id, value);
        }
        trace!("can-dict: {} written ({} bytes)", id, n);
        Ok(())
    }

    /// Bus-facing read. Returns the number of bytes written to `out`; 0 means "nothing to send"
    /// and covers every failure (bad ID, unregistered, not readable).
    pub fn handle_read_request(&self, id: u8, out: &mut [u8]) -> usize {
        VarId::try_from(id)
            .and_then(|id| self.read(id, out))
            .unwrap_or(0)
    }

    /// Bus-facing write. `false` on any failure, in which case storage is untouched and no callback
    /// runs.
    pub fn handle_write_request(&self, id: u8, payload: &[u8]) -> bool {
        VarId::try_from(id)
            .and_then(|id| self.write(id, payload))
            .is_ok()
    }

    // ---------------------------------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------------------------------

    #[inline]
    fn cell(&self, storage: Storage<'m>) -> &Variable {
        match storage {
            Storage::Bound(memory) => memory,
            Storage::Owned(cell) => &self.pool[cell],
        }
    }

    pub(crate) fn active_slot(&self, id: VarId) -> Result<&Slot<'m>> {
        let slot = &self.slots[id.index()];
        if slot.is_active() {
            Ok(slot)
        } else {
            Err(Error::NotFound)
        }
    }

    fn active_slot_mut(&mut self, id: VarId) -> Result<&mut Slot<'m>> {
        let slot = &mut self.slots[id.index()];
        if slot.is_active() {
            Ok(slot)
        } else {
            Err(Error::NotFound)
        }
    }
}

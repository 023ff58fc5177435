//! Writer-preferring shared lock.
//!
//! Many readers xor one writer, with writers preferred over new readers so
//! a steady stream of emitters can't starve a pending `connect`/
//! `disconnect`. State (readers count, waiting-writers count, writer-held
//! flag) lives behind one `parking_lot::Mutex<State>` plus two condvars,
//! since every transition already happens under the single mutex.
//!
//! Used by [`crate::signal::Signal`] to gate emission against connect and
//! disconnect on the unguarded path.

use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};

use parking_lot::{Condvar, Mutex};

struct State {
    readers: u32,
    waiting_writers: u32,
    writer_held: bool,
}

pub struct SharedLock<T> {
    data: UnsafeCell<T>,
    state: Mutex<State>,
    readers_released: Condvar,
    writer_released: Condvar,
}

unsafe impl<T: Send> Send for SharedLock<T> {}
unsafe impl<T: Send> Sync for SharedLock<T> {}

impl<T> SharedLock<T> {
    pub fn new(value: T) -> Self {
        Self {
            data: UnsafeCell::new(value),
            state: Mutex::new(State { readers: 0, waiting_writers: 0, writer_held: false }),
            readers_released: Condvar::new(),
            writer_released: Condvar::new(),
        }
    }

    /// Acquires shared (read) access. Waits while a writer holds the lock
    /// or a writer is waiting, so writers are never starved by a steady
    /// stream of new readers.
    pub fn read(&self) -> SharedLockReadGuard<'_, T> {
        let mut st = self.state.lock();
        while st.writer_held || st.waiting_writers > 0 {
            self.writer_released.wait(&mut st);
        }
        st.readers += 1;
        SharedLockReadGuard { lock: self }
    }

    /// Acquires exclusive (write) access. Waits for `readers == 0 ∧
    /// ¬writer-held`.
    pub fn write(&self) -> SharedLockWriteGuard<'_, T> {
        let mut st = self.state.lock();
        st.waiting_writers += 1;
        while st.readers > 0 || st.writer_held {
            self.readers_released.wait(&mut st);
        }
        st.waiting_writers -= 1;
        st.writer_held = true;
        SharedLockWriteGuard { lock: self }
    }

    fn unlock_read(&self) {
        let mut st = self.state.lock();
        st.readers -= 1;
        if st.readers == 0 {
            self.readers_released.notify_all();
        }
    }

    fn unlock_write(&self) {
        let mut st = self.state.lock();
        st.writer_held = false;
        drop(st);
        // A waiting writer is preferred, but either a writer or the next
        // batch of readers may be runnable now; wake both sides and let
        // them re-check their own predicate.
        self.readers_released.notify_all();
        self.writer_released.notify_all();
    }
}

pub struct SharedLockReadGuard<'a, T> {
    lock: &'a SharedLock<T>,
}

impl<T> Deref for SharedLockReadGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> Drop for SharedLockReadGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.unlock_read();
    }
}

pub struct SharedLockWriteGuard<'a, T> {
    lock: &'a SharedLock<T>,
}

impl<T> Deref for SharedLockWriteGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for SharedLockWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for SharedLockWriteGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.unlock_write();
    }
}

use spin::Mutex;

/// Runs `f` with maskable interrupts disabled, restoring the previous state after.
#[cfg(target_os = "none")]
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    x86_64::instructions::interrupts::without_interrupts(f)
}

#[cfg(not(target_os = "none"))]
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    f()
}

/// State shared between interrupt handlers and the main loop.
///
/// Every access masks interrupts for the duration of the closure, so the
/// main loop never observes a half-applied update and a handler never
/// spins on a lock held by the code it interrupted.
pub struct IrqMutex<T> {
    inner: Mutex<T>,
}

impl<T> IrqMutex<T> {
    pub const fn new(value: T) -> Self {
        Self { inner: Mutex::new(value) }
    }

    pub fn lock<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        without_interrupts(|| {
            let mut state = self.inner.lock();
            f(&mut state)
        })
    }

    /// Like `lock`, but gives up instead of spinning when the state is busy.
    pub fn try_lock<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        without_interrupts(|| {
            let mut state = self.inner.try_lock()?;
            Some(f(&mut state))
        })
    }
}

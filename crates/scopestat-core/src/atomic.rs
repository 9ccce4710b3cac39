//! Lock-free numeric cells backing every metric instance.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Atomic `i64` used by counters and gauges.
#[derive(Debug, Default)]
pub struct AtomicInt64(AtomicI64);

impl AtomicInt64 {
    pub fn new(v: i64) -> Self {
        Self(AtomicI64::new(v))
    }

    pub fn inc(&self) {
        self.add(1);
    }

    pub fn add(&self, v: i64) {
        self.0.fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, v: i64) {
        self.0.store(v, Ordering::Relaxed);
    }
}

/// Atomic `f64` stored as its bit pattern; `add` is a CAS loop.
#[derive(Debug, Default)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub fn add(&self, v: f64) {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + v).to_bits();
            match self
                .0
                .compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(seen) => current = seen,
            }
        }
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_add_accumulates() {
        let f = AtomicF64::default();
        assert_eq!(f.get(), 0.0);
        f.add(0.5);
        f.add(0.25);
        assert_eq!(f.get(), 0.75);
    }
}

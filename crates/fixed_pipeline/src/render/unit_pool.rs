//! Hardware texture-unit pool
//!
//! Context-scoped allocator handing out fixed-function texture units for a
//! single render/post-render cycle. Allocation is lowest-free-first so that
//! units are handed out in a stable order across frames.
//!
//! ```text
//! TextureUnitPool (capacity = max texture units)
//!     allocate() ──► lowest free unit, or None when exhausted
//!     free(unit) ──► unit returned; freeing twice is a logged no-op
//! ```

/// Allocator over `[0, capacity)` hardware texture units
#[derive(Debug, Clone)]
pub struct TextureUnitPool {
    /// Allocation flag per unit
    allocated: Vec<bool>,
    /// Number of units currently handed out
    in_use: usize,
}

impl TextureUnitPool {
    /// Create a pool covering `capacity` units
    pub fn new(capacity: u32) -> Self {
        Self {
            allocated: vec![false; capacity as usize],
            in_use: 0,
        }
    }

    /// Allocate the lowest free unit
    ///
    /// Returns `None` when every unit is in use.
    pub fn allocate(&mut self) -> Option<u32> {
        let index = self.allocated.iter().position(|taken| !taken)?;
        let unit = u32::try_from(index).ok()?;
        self.allocated[index] = true;
        self.in_use += 1;
        log::trace!("Allocated texture unit {} ({} free)", unit, self.free_count());
        Some(unit)
    }

    /// Return a unit to the pool
    ///
    /// Freeing a unit that is not allocated, or that lies outside the pool,
    /// leaves the pool untouched.
    pub fn free(&mut self, unit: u32) {
        match self.allocated.get_mut(unit as usize) {
            Some(taken) if *taken => {
                *taken = false;
                self.in_use -= 1;
                log::trace!("Freed texture unit {} ({} free)", unit, self.free_count());
            }
            Some(_) => log::warn!("Texture unit {} freed while not allocated", unit),
            None => log::warn!(
                "Texture unit {} freed but pool only covers {} units",
                unit,
                self.capacity()
            ),
        }
    }

    /// Whether `unit` is currently handed out
    pub fn is_allocated(&self, unit: u32) -> bool {
        self.allocated.get(unit as usize).copied().unwrap_or(false)
    }

    /// Total number of units managed
    pub fn capacity(&self) -> usize {
        self.allocated.len()
    }

    /// Number of units available for allocation
    pub fn free_count(&self) -> usize {
        self.allocated.len() - self.in_use
    }

    /// Number of units currently handed out
    pub fn allocated_count(&self) -> usize {
        self.in_use
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocates_lowest_free_unit() {
        let mut pool = TextureUnitPool::new(3);
        assert_eq!(pool.allocate(), Some(0));
        assert_eq!(pool.allocate(), Some(1));

        pool.free(0);
        assert_eq!(pool.allocate(), Some(0));
        assert_eq!(pool.allocate(), Some(2));
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn test_exhaustion_returns_none() {
        let mut pool = TextureUnitPool::new(1);
        assert_eq!(pool.allocate(), Some(0));
        assert_eq!(pool.allocate(), None);
        assert_eq!(pool.allocated_count(), 1);
    }

    #[test]
    fn test_double_free_is_ignored() {
        let mut pool = TextureUnitPool::new(2);
        let unit = pool.allocate().unwrap();
        pool.free(unit);
        pool.free(unit);
        assert_eq!(pool.free_count(), 2);
        assert!(!pool.is_allocated(unit));
    }

    #[test]
    fn test_out_of_range_free_is_ignored() {
        let mut pool = TextureUnitPool::new(2);
        pool.allocate();
        pool.free(9);
        assert_eq!(pool.free_count(), 1);
        assert!(!pool.is_allocated(9));
    }

    #[test]
    fn test_empty_pool() {
        let mut pool = TextureUnitPool::new(0);
        assert_eq!(pool.capacity(), 0);
        assert_eq!(pool.allocate(), None);
    }
}

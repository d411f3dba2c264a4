/// A slab of items addressed by index, recycling freed slots.
///
/// Landmark ids are indices into this, so a slot is only reused after the
/// entry living there has been deallocated.
#[derive(Debug)]
pub struct Allocator<T> {
    items: Vec<Option<T>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> Default for Allocator<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Allocator<T> {
    pub fn allocate(&mut self, item: T) -> usize {
        self.len += 1;

        if let Some(free) = self.free_list.pop() {
            debug_assert!(self.items[free].is_none());
            self.items[free] = Some(item);
            return free;
        }

        self.items.push(Some(item));
        self.items.len() - 1
    }

    /// Takes the item out of its slot, or returns `None` if the slot is
    /// already free.
    pub fn deallocate(&mut self, id: usize) -> Option<T> {
        let item = self.items.get_mut(id)?.take()?;
        self.free_list.push(id);
        self.len -= 1;
        Some(item)
    }

    pub fn get(&self, id: usize) -> Option<&T> {
        self.items.get(id)?.as_ref()
    }

    pub fn get_mut(&mut self, id: usize) -> Option<&mut T> {
        self.items.get_mut(id)?.as_mut()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> ::std::ops::Index<usize> for Allocator<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.get(index).expect("Use of landmark after free")
    }
}

impl<T> ::std::ops::IndexMut<usize> for Allocator<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.get_mut(index).expect("Use of landmark after free")
    }
}

#[cfg(test)]
mod tests {
    use super::Allocator;

    #[test]
    fn reuses_freed_slots() {
        let mut allocator = Allocator::default();
        let a = allocator.allocate("a");
        let b = allocator.allocate("b");
        assert_eq!(allocator.len(), 2);

        assert_eq!(allocator.deallocate(a), Some("a"));
        assert_eq!(allocator.deallocate(a), None);
        assert!(allocator.get(a).is_none());

        let c = allocator.allocate("c");
        assert_eq!(c, a);
        assert_eq!(allocator[b], "b");
        assert_eq!(allocator[c], "c");
        assert_eq!(allocator.len(), 2);
    }

    #[test]
    fn out_of_range_lookups_are_none() {
        let mut allocator = Allocator::<u32>::default();
        assert!(allocator.get(3).is_none());
        assert!(allocator.deallocate(3).is_none());
        assert!(allocator.is_empty());
    }
}

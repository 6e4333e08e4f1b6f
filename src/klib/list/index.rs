//! Lista intrusiva indexada.
//!
//! Os elos (`Link`) moram dentro dos próprios elementos, que ficam em algum
//! armazenamento externo (a arena de tarefas). A lista guarda só cabeça,
//! cauda e tamanho; inserir e remover nunca alocam.
//!
//! Um elemento pode estar em várias listas ao mesmo tempo desde que cada uma
//! use um `Link` diferente (ex.: fila de execução e wait queue). Inserir um
//! elemento cujo `Link` já está em uso é um erro de programação e causa pânico.

use core::marker::PhantomData;

/// Elo embutido no elemento.
#[derive(Debug, Clone, Copy)]
pub struct Link<K> {
    prev: Option<K>,
    next: Option<K>,
    linked: bool,
}

impl<K> Link<K> {
    pub const fn new() -> Self {
        Self {
            prev: None,
            next: None,
            linked: false,
        }
    }

    #[inline]
    pub fn is_linked(&self) -> bool {
        self.linked
    }
}

impl<K> Default for Link<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Armazenamento que hospeda os elos de uma lista.
///
/// Implementado por adaptadores que escolhem *qual* `Link` do elemento usar.
pub trait LinkStore<K: Copy + Eq> {
    fn link(&self, key: K) -> &Link<K>;
    fn link_mut(&mut self, key: K) -> &mut Link<K>;
}

#[derive(Debug)]
pub struct IndexList<K> {
    head: Option<K>,
    tail: Option<K>,
    len: usize,
}

impl<K: Copy + Eq> IndexList<K> {
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn front(&self) -> Option<K> {
        self.head
    }

    /// Insere `key` no fim da lista.
    ///
    /// # Panics
    /// Se o elo de `key` já estiver em uso.
    pub fn push_back<S: LinkStore<K>>(&mut self, store: &mut S, key: K) {
        {
            let link = store.link_mut(key);
            assert!(!link.linked, "IndexList: elemento já está em uma lista");
            link.linked = true;
            link.prev = self.tail;
            link.next = None;
        }

        match self.tail {
            Some(tail) => store.link_mut(tail).next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);
        self.len += 1;
    }

    /// Remove e retorna o primeiro elemento.
    pub fn pop_front<S: LinkStore<K>>(&mut self, store: &mut S) -> Option<K> {
        let head = self.head?;
        self.unlink(store, head);
        Some(head)
    }

    /// Remove `key` da lista. Retorna `false` se o elo não estava em uso.
    ///
    /// O chamador garante que, se em uso, o elo pertence a *esta* lista.
    pub fn remove<S: LinkStore<K>>(&mut self, store: &mut S, key: K) -> bool {
        if !store.link(key).linked {
            return false;
        }
        self.unlink(store, key);
        true
    }

    fn unlink<S: LinkStore<K>>(&mut self, store: &mut S, key: K) {
        let (prev, next) = {
            let link = store.link_mut(key);
            let pair = (link.prev, link.next);
            *link = Link::new();
            pair
        };

        match prev {
            Some(p) => store.link_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => store.link_mut(n).prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    /// Percorre a lista da cabeça à cauda.
    pub fn iter<'a, S: LinkStore<K>>(&self, store: &'a S) -> Iter<'a, K, S> {
        Iter {
            store,
            cursor: self.head,
            _marker: PhantomData,
        }
    }
}

impl<K: Copy + Eq> Default for IndexList<K> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Iter<'a, K, S> {
    store: &'a S,
    cursor: Option<K>,
    _marker: PhantomData<K>,
}

impl<'a, K: Copy + Eq, S: LinkStore<K>> Iterator for Iter<'a, K, S> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        let key = self.cursor?;
        self.cursor = self.store.link(key).next;
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    struct Slots(Vec<Link<usize>>);

    impl LinkStore<usize> for Slots {
        fn link(&self, key: usize) -> &Link<usize> {
            &self.0[key]
        }
        fn link_mut(&mut self, key: usize) -> &mut Link<usize> {
            &mut self.0[key]
        }
    }

    fn slots(n: usize) -> Slots {
        Slots((0..n).map(|_| Link::new()).collect())
    }

    #[test]
    fn fifo_order() {
        let mut store = slots(4);
        let mut list = IndexList::new();
        for k in [2, 0, 3] {
            list.push_back(&mut store, k);
        }
        assert_eq!(list.iter(&store).collect::<Vec<_>>(), [2, 0, 3]);
        assert_eq!(list.pop_front(&mut store), Some(2));
        assert_eq!(list.pop_front(&mut store), Some(0));
        assert_eq!(list.len(), 1);
        assert!(!store.link(2).is_linked());
    }

    #[test]
    fn remove_from_middle_and_ends() {
        let mut store = slots(5);
        let mut list = IndexList::new();
        for k in 0..5 {
            list.push_back(&mut store, k);
        }
        assert!(list.remove(&mut store, 2));
        assert!(list.remove(&mut store, 0));
        assert!(list.remove(&mut store, 4));
        assert!(!list.remove(&mut store, 4));
        assert_eq!(list.iter(&store).collect::<Vec<_>>(), [1, 3]);

        // Reinserir após remoção é permitido
        list.push_back(&mut store, 0);
        assert_eq!(list.iter(&store).collect::<Vec<_>>(), [1, 3, 0]);
    }

    #[test]
    #[should_panic(expected = "já está em uma lista")]
    fn double_insert_panics() {
        let mut store = slots(2);
        let mut list = IndexList::new();
        list.push_back(&mut store, 1);
        list.push_back(&mut store, 1);
    }
}

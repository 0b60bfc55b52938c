use crate::engine::Move;
use std::ops::Index;

// Legal chess positions top out at 218 moves.
const MAX_MOVES: usize = 256;

pub struct MoveList {
    pub moves: [Move; MAX_MOVES],
    pub count: usize,
}

impl Default for MoveList {
    fn default() -> Self {
        Self {
            moves: [Move::default(); MAX_MOVES],
            count: 0,
        }
    }
}

impl MoveList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mv: Move) {
        if let Some(slot) = self.moves.get_mut(self.count) {
            *slot = mv;
            self.count += 1;
        } else {
            debug_assert!(false, "MoveList overflow! Max moves: {MAX_MOVES}");
        }
    }

    pub const fn len(&self) -> usize {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.get(0..self.count).unwrap_or(&[]).iter()
    }

    pub fn extend(&mut self, other: &Self) {
        for mv in other {
            self.push(*mv);
        }
    }

    /// Turns the list into a selection picker.
    pub const fn picker(self) -> MovePicker {
        MovePicker {
            list: self,
            taken: [false; MAX_MOVES],
        }
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Index<usize> for MoveList {
    type Output = Move;

    fn index(&self, index: usize) -> &Self::Output {
        self.moves.get(index).unwrap_or(&self.moves[0])
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::iter::Take<std::array::IntoIter<Move, MAX_MOVES>>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.into_iter().take(self.count)
    }
}

/// Selection ordering: each call hands out the best remaining move.
///
/// Handed-out entries are flagged so they are never selected twice; scores
/// are left untouched. Ties go to the earlier entry.
pub struct MovePicker {
    list: MoveList,
    taken: [bool; MAX_MOVES],
}

impl MovePicker {
    pub const fn len(&self) -> usize {
        self.list.count
    }

    pub const fn is_empty(&self) -> bool {
        self.list.count == 0
    }

    pub fn pick_next(&mut self) -> Option<Move> {
        let mut best: Option<(usize, i32)> = None;
        for (i, (mv, taken)) in self.list.iter().zip(&self.taken).enumerate() {
            if *taken {
                continue;
            }
            let better = match best {
                Some((_, score)) => mv.score > score,
                None => true,
            };
            if better {
                best = Some((i, mv.score));
            }
        }
        let (index, _) = best?;
        *self.taken.get_mut(index)? = true;
        self.list.moves.get(index).copied()
    }
}

impl Iterator for MovePicker {
    type Item = Move;

    fn next(&mut self) -> Option<Self::Item> {
        self.pick_next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(to: u8, score: i32) -> Move {
        Move {
            to,
            score,
            ..Move::default()
        }
    }

    #[test]
    fn test_picker_descending_order() {
        let mut list = MoveList::new();
        for (to, score) in [(1, 5), (2, 90), (3, -40), (4, 90), (5, 12)] {
            list.push(scored(to, score));
        }
        let order: Vec<u8> = list.picker().map(|mv| mv.to).collect();
        // Equal scores keep generation order.
        assert_eq!(order, vec![2, 4, 5, 1, 3]);
    }

    #[test]
    fn test_picker_returns_original_scores() {
        let mut list = MoveList::new();
        list.push(scored(9, 300));
        let mut picker = list.picker();
        assert_eq!(picker.len(), 1);
        assert_eq!(picker.pick_next().map(|mv| mv.score), Some(300));
        assert_eq!(picker.pick_next(), None);
    }

    #[test]
    fn test_picker_hands_out_minimum_scores() {
        let mut list = MoveList::new();
        list.push(scored(1, i32::MIN));
        list.push(scored(2, 7));
        list.push(scored(3, i32::MIN));
        let picked: Vec<(u8, i32)> = list.picker().map(|mv| (mv.to, mv.score)).collect();
        assert_eq!(picked, vec![(2, 7), (1, i32::MIN), (3, i32::MIN)]);
    }

    #[test]
    fn test_empty_picker() {
        let mut picker = MoveList::new().picker();
        assert!(picker.is_empty());
        assert!(picker.pick_next().is_none());
    }

    #[test]
    fn test_extend_and_index() {
        let mut a = MoveList::new();
        a.push(scored(1, 1));
        let mut b = MoveList::new();
        b.push(scored(2, 2));
        b.push(scored(3, 3));
        a.extend(&b);
        assert_eq!(a.len(), 3);
        assert_eq!(a[2].to, 3);
    }
}

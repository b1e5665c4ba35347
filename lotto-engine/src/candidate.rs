use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use lotto_history::{PICK_COUNT, POOL_SIZE};

/// Six distinct numbers in `1..=45`, ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Candidate([u8; PICK_COUNT]);

impl Candidate {
    /// Sorts `numbers`; `None` unless they are six distinct values in range.
    pub fn new(numbers: &[u8]) -> Option<Self> {
        let mut sorted: [u8; PICK_COUNT] = numbers.try_into().ok()?;
        sorted.sort_unstable();
        let in_range = sorted.iter().all(|n| (1..=POOL_SIZE).contains(n));
        let distinct = sorted.windows(2).all(|w| w[0] < w[1]);
        (in_range && distinct).then_some(Self(sorted))
    }

    pub fn numbers(&self) -> &[u8; PICK_COUNT] {
        &self.0
    }

    pub fn contains(&self, number: u8) -> bool {
        self.0.contains(&number)
    }

    pub fn sum(&self) -> u32 {
        self.0.iter().map(|&n| n as u32).sum()
    }

    pub fn odd_count(&self) -> usize {
        self.0.iter().filter(|&&n| n % 2 == 1).count()
    }

    /// Longest run of consecutive integers (1 when no two numbers touch).
    pub fn longest_run(&self) -> usize {
        let mut longest = 1;
        let mut current = 1;
        for w in self.0.windows(2) {
            if w[1] == w[0] + 1 {
                current += 1;
                longest = longest.max(current);
            } else {
                current = 1;
            }
        }
        longest
    }

    /// Arithmetic complexity: distinct pairwise differences minus five.
    pub fn ac(&self) -> u32 {
        let mut diffs = HashSet::new();
        for i in 0..self.0.len() {
            for j in (i + 1)..self.0.len() {
                diffs.insert(self.0[j] - self.0[i]);
            }
        }
        diffs.len() as u32 - (PICK_COUNT as u32 - 1)
    }
}

/// The lowest six numbers.
impl Default for Candidate {
    fn default() -> Self {
        Self([1, 2, 3, 4, 5, 6])
    }
}

impl TryFrom<Vec<u8>> for Candidate {
    type Error = String;

    fn try_from(numbers: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(&numbers).ok_or_else(|| format!("invalid ticket {:?}", numbers))
    }
}

impl From<Candidate> for Vec<u8> {
    fn from(candidate: Candidate) -> Self {
        candidate.0.to_vec()
    }
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.0
            .iter()
            .map(|n| format!("{:2}", n))
            .collect::<Vec<_>>()
            .join(" - ");
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sorts_and_validates() {
        let c = Candidate::new(&[38, 1, 27, 9, 17, 7]).unwrap();
        assert_eq!(c.numbers(), &[1, 7, 9, 17, 27, 38]);
        assert!(Candidate::new(&[1, 2, 3, 4, 5]).is_none());
        assert!(Candidate::new(&[1, 1, 3, 4, 5, 6]).is_none());
        assert!(Candidate::new(&[0, 2, 3, 4, 5, 6]).is_none());
        assert!(Candidate::new(&[1, 2, 3, 4, 5, 46]).is_none());
    }

    #[test]
    fn test_sum_and_odd() {
        let c = Candidate::new(&[1, 7, 9, 17, 27, 38]).unwrap();
        assert_eq!(c.sum(), 99);
        assert_eq!(c.odd_count(), 5);
    }

    #[test]
    fn test_longest_run() {
        assert_eq!(Candidate::new(&[1, 3, 5, 7, 9, 11]).unwrap().longest_run(), 1);
        assert_eq!(Candidate::new(&[1, 2, 5, 7, 9, 11]).unwrap().longest_run(), 2);
        assert_eq!(Candidate::new(&[1, 2, 3, 7, 9, 11]).unwrap().longest_run(), 3);
        assert_eq!(Candidate::new(&[1, 5, 9, 10, 11, 12]).unwrap().longest_run(), 4);
    }

    #[test]
    fn test_ac() {
        // Arithmetic progression: differences 5,10,15,20,25 only.
        assert_eq!(Candidate::new(&[1, 6, 11, 16, 21, 26]).unwrap().ac(), 0);
        // 1,2,4,8,16,32: all 15 differences distinct.
        assert_eq!(Candidate::new(&[1, 2, 4, 8, 16, 32]).unwrap().ac(), 10);
    }

    #[test]
    fn test_display() {
        let c = Candidate::new(&[1, 7, 9, 17, 27, 38]).unwrap();
        assert_eq!(c.to_string(), " 1 -  7 -  9 - 17 - 27 - 38");
    }

    #[test]
    fn test_serde_as_array() {
        let c = Candidate::new(&[3, 14, 15, 26, 35, 41]).unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "[3,14,15,26,35,41]");
        assert!(serde_json::from_str::<Candidate>("[1,1,2,3,4,5]").is_err());
    }
}

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Highest ball number of the 6/45 game.
pub const POOL_SIZE: u8 = 45;
/// Balls drawn per draw, bonus excluded.
pub const PICK_COUNT: usize = 6;

/// A recorded draw. Field aliases accept the collector's JSON names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    #[serde(alias = "drwNo", alias = "drw_no")]
    pub draw_id: u32,
    #[serde(default, alias = "drwNoDate", alias = "drw_date", skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub numbers: [u8; PICK_COUNT],
    pub bonus: u8,
    #[serde(default, alias = "firstWinamnt", alias = "first_win_amnt", skip_serializing_if = "Option::is_none")]
    pub first_prize: Option<u64>,
}

impl Draw {
    /// Builds a validated draw; the main numbers are stored ascending.
    pub fn new(draw_id: u32, mut numbers: [u8; PICK_COUNT], bonus: u8) -> Result<Self> {
        validate_draw(&numbers, bonus)?;
        numbers.sort_unstable();
        Ok(Self {
            draw_id,
            date: None,
            numbers,
            bonus,
            first_prize: None,
        })
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_first_prize(mut self, amount: u64) -> Self {
        self.first_prize = Some(amount);
        self
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.contains(&number)
    }

    /// Main numbers shared with `ticket`.
    pub fn matches(&self, ticket: &[u8]) -> usize {
        ticket.iter().filter(|&&n| self.contains(n)).count()
    }
}

pub fn validate_draw(numbers: &[u8; PICK_COUNT], bonus: u8) -> Result<()> {
    for &n in numbers {
        if !(1..=POOL_SIZE).contains(&n) {
            bail!("Number {} out of range (1-{})", n, POOL_SIZE);
        }
    }
    if !(1..=POOL_SIZE).contains(&bonus) {
        bail!("Bonus {} out of range (1-{})", bonus, POOL_SIZE);
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Duplicate number: {}", numbers[i]);
            }
        }
    }
    if numbers.contains(&bonus) {
        bail!("Bonus {} repeats a main number", bonus);
    }
    Ok(())
}

/// Deterministic, valid draws with ids `1..=n`, returned oldest first.
/// Consecutive draws shift by 13 so windows see varied numbers.
pub fn make_test_draws(n: usize) -> Vec<Draw> {
    (0..n)
        .map(|i| {
            let base = (i * 13) % POOL_SIZE as usize;
            let mut numbers = [0u8; PICK_COUNT];
            for (k, slot) in numbers.iter_mut().enumerate() {
                *slot = ((base + k * 7) % POOL_SIZE as usize) as u8 + 1;
            }
            numbers.sort_unstable();
            let bonus = ((base + PICK_COUNT * 7) % POOL_SIZE as usize) as u8 + 1;
            Draw {
                draw_id: i as u32 + 1,
                date: None,
                numbers,
                bonus,
                first_prize: None,
            }
        })
        .collect()
}

use chrono::{Datelike, NaiveDate, Utc};
use craftrec_core::Festival;
use std::collections::BTreeSet;

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// A clock stuck on one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Month-based festival season table
pub struct SeasonalCalendar {
    clock: Box<dyn Clock>,
}

impl Default for SeasonalCalendar {
    fn default() -> Self {
        Self::new(Box::new(SystemClock))
    }
}

impl SeasonalCalendar {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Festivals in season during `month` (1-12). Out-of-range months have none.
    pub fn festivals_for_month(month: u32) -> BTreeSet<Festival> {
        use Festival::*;
        let festivals: &[Festival] = match month {
            1 => &[Pongal, WeddingSeason],
            2 => &[WeddingSeason],
            3 => &[Holi],
            4 => &[Baisakhi],
            8 => &[RakshaBandhan, Onam, GaneshChaturthi],
            9 => &[Onam, GaneshChaturthi, Navratri],
            10 => &[Navratri, DurgaPuja, Diwali],
            11 => &[Diwali, WeddingSeason],
            12 => &[Christmas, WeddingSeason],
            _ => &[],
        };
        festivals.iter().copied().collect()
    }

    pub fn active_festivals(&self) -> BTreeSet<Festival> {
        Self::festivals_for_month(self.clock.today().month())
    }
}

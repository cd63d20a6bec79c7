//! The per-facility interval store (spec.md §4.2), grounded in the
//! teacher's `reservation_store.rs` (a central record store keyed by an
//! opaque id) composed with `reservations.rs` (an ordered per-owner index
//! over that store) — here the "owner" is a facility and the ordering key
//! is `startMin` rather than a `HashSet` of ids.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::SocketAddr;

use crate::domain::reservation::Reservation;
use crate::time_model::{day_name, MINUTES_PER_WEEK};
use crate::wire::ProtocolError;

const MINUTES_PER_DAY: i32 = 1440;

#[derive(Debug)]
pub struct ScheduleStore {
    facilities: HashSet<String>,
    reservations: HashMap<String, Reservation>,
    /// facility -> (startMin -> reservation id), kept sorted by start so
    /// overlap checks and query rendering never need to sort on the fly.
    index: HashMap<String, BTreeMap<i32, String>>,
    next_seq: HashMap<String, u64>,
}

impl ScheduleStore {
    pub fn new(facility_names: impl IntoIterator<Item = String>) -> Self {
        let facilities: HashSet<String> = facility_names.into_iter().collect();
        let index = facilities.iter().map(|name| (name.clone(), BTreeMap::new())).collect();
        Self { facilities, reservations: HashMap::new(), index, next_seq: HashMap::new() }
    }

    pub fn has_facility(&self, name: &str) -> bool {
        self.facilities.contains(name)
    }

    pub fn facility_count(&self) -> usize {
        self.facilities.len()
    }

    pub fn reservation_count(&self) -> usize {
        self.reservations.len()
    }

    fn overlaps(&self, facility: &str, start: i32, end: i32, exclude: Option<&str>) -> bool {
        let Some(idx) = self.index.get(facility) else { return false };
        for id in idx.range(..end).map(|(_, id)| id) {
            if exclude == Some(id.as_str()) {
                continue;
            }
            if let Some(existing) = self.reservations.get(id) {
                if existing.start_min < end && existing.end_min > start {
                    return true;
                }
            }
        }
        false
    }

    fn next_id(&mut self, facility: &str) -> String {
        let counter = self.next_seq.entry(facility.to_string()).or_insert(0);
        *counter += 1;
        format!("{}-{}", facility, counter)
    }

    /// spec.md §4.2 `book`.
    pub fn book(&mut self, facility: &str, start: i32, end: i32, owner: SocketAddr) -> Result<String, ProtocolError> {
        if !self.has_facility(facility) {
            return Err(ProtocolError::UnknownFacility(facility.to_string()));
        }
        if start < 0 || end > MINUTES_PER_WEEK || start >= end {
            return Err(ProtocolError::InvalidTime);
        }
        if self.overlaps(facility, start, end, None) {
            return Err(ProtocolError::Conflict);
        }

        let id = self.next_id(facility);
        self.reservations.insert(id.clone(), Reservation { id: id.clone(), facility: facility.to_string(), start_min: start, end_min: end, owner });
        self.index.entry(facility.to_string()).or_default().insert(start, id.clone());
        Ok(id)
    }

    /// spec.md §4.2 `change`. Returns `(facility, new_start, new_end)` so
    /// the dispatcher can trigger a monitor broadcast for the right
    /// facility.
    pub fn change(&mut self, id: &str, offset_minutes: i32) -> Result<(String, i32, i32), ProtocolError> {
        let existing = self.reservations.get(id).cloned().ok_or_else(|| ProtocolError::NotFound(id.to_string()))?;
        let new_start = existing.start_min + offset_minutes;
        let new_end = existing.end_min + offset_minutes;
        if new_start < 0 || new_end > MINUTES_PER_WEEK || new_start >= new_end {
            return Err(ProtocolError::InvalidTime);
        }
        if self.overlaps(&existing.facility, new_start, new_end, Some(id)) {
            return Err(ProtocolError::Conflict);
        }

        if let Some(idx) = self.index.get_mut(&existing.facility) {
            idx.remove(&existing.start_min);
            idx.insert(new_start, id.to_string());
        }
        if let Some(res) = self.reservations.get_mut(id) {
            res.start_min = new_start;
            res.end_min = new_end;
        }
        Ok((existing.facility, new_start, new_end))
    }

    /// spec.md §4.2 `extend`. `extend_minutes` may be negative to shorten.
    pub fn extend(&mut self, id: &str, extend_minutes: i32) -> Result<(String, i32, i32), ProtocolError> {
        let existing = self.reservations.get(id).cloned().ok_or_else(|| ProtocolError::NotFound(id.to_string()))?;
        let new_end = existing.end_min + extend_minutes;
        if new_end > MINUTES_PER_WEEK || new_end <= existing.start_min {
            return Err(ProtocolError::InvalidTime);
        }
        if self.overlaps(&existing.facility, existing.start_min, new_end, Some(id)) {
            return Err(ProtocolError::Conflict);
        }

        if let Some(res) = self.reservations.get_mut(id) {
            res.end_min = new_end;
        }
        Ok((existing.facility, existing.start_min, new_end))
    }

    /// spec.md §4.2 `query`: for each requested day (deduplicated in
    /// first-occurrence order) render the busy intervals and the free
    /// complement within that day.
    pub fn query(&self, facility: &str, days: &[u8]) -> Result<String, ProtocolError> {
        if !self.has_facility(facility) {
            return Err(ProtocolError::UnknownFacility(facility.to_string()));
        }

        let mut seen = HashSet::new();
        let mut ordered_days = Vec::new();
        for &day in days {
            if seen.insert(day) {
                ordered_days.push(day);
            }
        }

        let mut out = String::new();
        for day in ordered_days {
            let day_start = (day as i32 - 1) * MINUTES_PER_DAY;
            let day_end = day_start + MINUTES_PER_DAY;

            out.push_str(&format!("{} ({}):", day, day_name(day)));

            let mut cursor = day_start;
            let mut any_busy = false;
            if let Some(idx) = self.index.get(facility) {
                for (_, res_id) in idx.range(..day_end) {
                    let Some(res) = self.reservations.get(res_id) else { continue };
                    if res.start_min >= day_end || res.end_min <= day_start {
                        continue;
                    }
                    let visible_start = res.start_min.max(day_start);
                    let visible_end = res.end_min.min(day_end);
                    if visible_start > cursor {
                        out.push_str(&format!(" free {}-{};", clock(cursor - day_start), clock(visible_start - day_start)));
                    }
                    out.push_str(&format!(" busy {}-{} ({});", clock(visible_start - day_start), clock(visible_end - day_start), res.id));
                    cursor = visible_end;
                    any_busy = true;
                }
            }
            if cursor < day_end {
                out.push_str(&format!(" free {}-{};", clock(cursor - day_start), clock(MINUTES_PER_DAY)));
            }
            if !any_busy && cursor == day_start {
                out.push_str(" free 00:00-24:00;");
            }
            out.push('\n');
        }
        Ok(out)
    }
}

/// Formats minutes-of-day (`0..=1440`) as `HH:MM`, with `1440` rendered as
/// `24:00` rather than wrapping to the next day.
fn clock(minutes_of_day: i32) -> String {
    if minutes_of_day >= MINUTES_PER_DAY {
        return "24:00".to_string();
    }
    format!("{:02}:{:02}", minutes_of_day / 60, minutes_of_day % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn addr() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 9999)
    }

    fn store() -> ScheduleStore {
        ScheduleStore::new(["GymA".to_string()])
    }

    #[test]
    fn book_rejects_unknown_facility() {
        let mut s = store();
        let err = s.book("GymB", 0, 60, addr()).unwrap_err();
        assert_eq!(err, ProtocolError::UnknownFacility("GymB".to_string()));
    }

    #[test]
    fn book_rejects_equal_start_end() {
        let mut s = store();
        let err = s.book("GymA", 540, 540, addr()).unwrap_err();
        assert_eq!(err, ProtocolError::InvalidTime);
    }

    #[test]
    fn book_detects_overlap() {
        let mut s = store();
        s.book("GymA", 540, 600, addr()).unwrap();
        let err = s.book("GymA", 570, 630, addr()).unwrap_err();
        assert_eq!(err, ProtocolError::Conflict);
    }

    #[test]
    fn half_open_intervals_can_abut() {
        let mut s = store();
        s.book("GymA", 540, 600, addr()).unwrap();
        // [600, 660) does not overlap [540, 600)
        let id = s.book("GymA", 600, 660, addr()).unwrap();
        assert!(id.starts_with("GymA-"));
    }

    #[test]
    fn change_moves_reservation_and_can_abut() {
        let mut s = store();
        let a = s.book("GymA", 540, 600, addr()).unwrap();
        s.book("GymA", 660, 720, addr()).unwrap();
        // Move a to [600, 660) — abuts the second reservation's start, legal.
        let (facility, start, end) = s.change(&a, 60).unwrap();
        assert_eq!(facility, "GymA");
        assert_eq!((start, end), (600, 660));
    }

    #[test]
    fn change_out_of_week_is_invalid_time() {
        let mut s = store();
        let a = s.book("GymA", 10_000, 10_060, addr()).unwrap();
        let err = s.change(&a, 5000).unwrap_err();
        assert_eq!(err, ProtocolError::InvalidTime);
    }

    #[test]
    fn change_unknown_id_is_not_found() {
        let mut s = store();
        assert_eq!(s.change("missing", 10).unwrap_err(), ProtocolError::NotFound("missing".to_string()));
    }

    #[test]
    fn extend_shortening_past_start_is_invalid_time() {
        let mut s = store();
        let a = s.book("GymA", 540, 600, addr()).unwrap();
        let err = s.extend(&a, -100).unwrap_err();
        assert_eq!(err, ProtocolError::InvalidTime);
    }

    #[test]
    fn extend_positive_within_week_succeeds() {
        let mut s = store();
        let a = s.book("GymA", 540, 600, addr()).unwrap();
        let (_, start, end) = s.extend(&a, 30).unwrap();
        assert_eq!((start, end), (540, 630));
    }

    #[test]
    fn query_dedups_days_in_first_occurrence_order() {
        let mut s = store();
        s.book("GymA", 540, 600, addr()).unwrap();
        let text = s.query("GymA", &[2, 1, 2]).unwrap();
        let day2_pos = text.find("2 (").unwrap();
        let day1_pos = text.find("1 (").unwrap();
        assert!(day2_pos < day1_pos);
        assert_eq!(text.matches("2 (").count(), 1);
    }
}

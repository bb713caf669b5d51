//! Timezone abbreviation table.
//!
//! Maps every abbreviation in the IANA database (`PST`, `CEST`, ...) and
//! every zone name (`Europe/Oslo`) to the distinct UTC offsets it stands for
//! this year, with the zones using each offset.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::{OffsetName, TZ_VARIANTS};

use crate::config::Offset as HourMinute;

/// Offset → zones using it.
pub type OffsetRegions = BTreeMap<HourMinute, BTreeSet<String>>;

/// Abbreviation or zone name → offsets.
pub type ZoneTable = HashMap<String, OffsetRegions>;

/// Splits an offset in seconds into signed hours and minutes.
pub fn split_offset(seconds: i32) -> HourMinute {
    (seconds / 3600, (seconds % 3600) / 60)
}

/// Builds the table by sampling every zone every 30 days of `year`.
///
/// Sampling catches both the standard and the daylight-saving abbreviation
/// of zones that switch.
pub fn build_zone_table(year: i32) -> ZoneTable {
    let mut table = ZoneTable::new();
    let Some(start) = NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return table;
    };

    for tz in &TZ_VARIANTS {
        for day in (0..365).step_by(30) {
            let instant = start + TimeDelta::days(day);
            let offset = tz.offset_from_utc_datetime(&instant);
            let key = split_offset(offset.fix().local_minus_utc());
            let name = tz.name().to_string();

            if let Some(abbreviation) = offset.abbreviation() {
                table
                    .entry(abbreviation.to_string())
                    .or_default()
                    .entry(key)
                    .or_default()
                    .insert(name.clone());
            }
            table
                .entry(name.clone())
                .or_default()
                .entry(key)
                .or_default()
                .insert(name);
        }
    }
    table
}

/// The table for the current year, built on first use.
pub fn zone_table() -> &'static ZoneTable {
    static TABLE: OnceLock<ZoneTable> = OnceLock::new();
    TABLE.get_or_init(|| build_zone_table(Utc::now().year()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_offset_keeps_sign() {
        assert_eq!(split_offset(-7 * 3600), (-7, 0));
        assert_eq!(split_offset(-(3 * 3600 + 30 * 60)), (-3, -30));
        assert_eq!(split_offset(5 * 3600 + 45 * 60), (5, 45));
    }

    #[test]
    fn test_pdt_is_unambiguous() {
        let table = zone_table();
        let pdt = &table["PDT"];
        assert_eq!(pdt.keys().copied().collect::<Vec<_>>(), vec![(-7, 0)]);
        assert!(pdt[&(-7, 0)].contains("America/Los_Angeles"));
    }

    #[test]
    fn test_cdt_is_ambiguous() {
        let cdt = &zone_table()["CDT"];
        assert!(cdt.contains_key(&(-5, 0)));
        assert!(cdt.contains_key(&(-4, 0)));
        assert!(cdt[&(-5, 0)].contains("America/Chicago"));
        assert!(cdt[&(-4, 0)].contains("America/Havana"));
    }

    #[test]
    fn test_zone_names_registered() {
        let table = zone_table();
        assert_eq!(
            table["Asia/Kolkata"].keys().copied().collect::<Vec<_>>(),
            vec![(5, 30)]
        );
        // Zones with daylight saving time carry both offsets.
        assert_eq!(table["Europe/Oslo"].len(), 2);
    }

    #[test]
    fn test_unknown_abbreviation_absent() {
        assert!(!zone_table().contains_key("XYZT"));
    }
}

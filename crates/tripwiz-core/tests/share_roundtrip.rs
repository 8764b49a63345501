// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use chrono::{Month, NaiveDate};
use tripwiz_core::share::{share_link, snapshot_from_entry, ShareSnapshot};
use tripwiz_core::{Destination, TravelPreferences, TripType};
use url::Url;

fn decoded(destination: &Destination, prefs: &TravelPreferences) -> (Destination, TravelPreferences) {
    let base = Url::parse("http://localhost:5173/").unwrap();
    let token = ShareSnapshot::capture(destination, prefs)
        .encode()
        .expect("snapshot should encode");
    let link = share_link(&base, &token);
    let snapshot = snapshot_from_entry(link.as_str()).expect("link should decode");
    (snapshot.destination(), snapshot.restore_preferences())
}

fn assert_same_trip(original: &TravelPreferences, restored: &TravelPreferences) {
    assert_eq!(restored.starting_point(), original.starting_point());
    assert_eq!(restored.trip_type(), original.trip_type());
    assert_eq!(restored.duration_days(), original.duration_days());
    assert_eq!(restored.budget_per_person(), original.budget_per_person());
    assert_eq!(restored.month(), original.month());
    assert_eq!(restored.dates(), original.dates());
}

#[test]
fn test_roundtrip_with_date_range() {
    let mut prefs = TravelPreferences::default();
    prefs.set_starting_point("São Paulo");
    prefs.toggle_trip_type(TripType::Nightlife);
    prefs.toggle_trip_type(TripType::Romantic);
    prefs.set_budget(4200);
    prefs.set_start_date(NaiveDate::from_ymd_opt(2026, 12, 20).unwrap());
    prefs.set_end_date(NaiveDate::from_ymd_opt(2027, 1, 2).unwrap());
    assert_eq!(prefs.duration_days(), 14);

    let mut destination = Destination::named("Rio de Janeiro", "Brazil");
    destination.match_score = 88;
    destination.activities = vec!["Sugarloaf".to_string()];

    let (restored_destination, restored) = decoded(&destination, &prefs);
    assert_eq!(restored_destination.city, "Rio de Janeiro");
    assert_eq!(restored_destination.country, "Brazil");
    assert_same_trip(&prefs, &restored);

    // Only the name survives; everything else is re-fetched.
    assert_eq!(restored_destination.match_score, 0);
    assert!(restored_destination.activities.is_empty());
    assert!(restored_destination.itinerary.is_none());
}

#[test]
fn test_roundtrip_with_month() {
    let mut prefs = TravelPreferences::default();
    prefs.set_starting_point("Denver, CO");
    prefs.toggle_trip_type(TripType::Wilderness);
    prefs.set_month(Some(Month::February));
    prefs.set_duration(5).unwrap();
    prefs.set_budget(100);

    let (_, restored) = decoded(&Destination::named("Reykjavík", "Iceland"), &prefs);
    assert_same_trip(&prefs, &restored);
}

#[test]
fn test_roundtrip_with_defaults() {
    let mut prefs = TravelPreferences::default();
    prefs.set_starting_point("Paris");
    let (_, restored) = decoded(&Destination::named("Rome", "Italy"), &prefs);
    assert_same_trip(&prefs, &restored);
    assert!(restored.trip_type().is_empty());
}

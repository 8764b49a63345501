// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Plain-text rendering of wizard views.

use std::fmt::Write;
use tripwiz_core::itinerary::{DayPlan, Itinerary, TravelRequirements};
use tripwiz_core::{Destination, WizardView};

pub fn destination(rank: usize, d: &Destination) -> String {
    let mut out = format!("{}. {} ({}% match)\n", rank, d.label(), d.match_score);
    if !d.match_reason.is_empty() {
        let _ = writeln!(out, "   Why: {}", d.match_reason);
    }
    if !d.activities.is_empty() {
        let _ = writeln!(out, "   Must-do: {}", d.activities.join("; "));
    }
    if !d.best_areas.is_empty() {
        let _ = writeln!(out, "   Stay in: {}", d.best_areas.join("; "));
    }
    out
}

pub fn recommendations(view: &WizardView<'_>) -> String {
    let mut out = String::from("\nRecommended destinations\n\n");
    for (i, d) in view.destinations.iter().enumerate() {
        out.push_str(&destination(i + 1, d));
        out.push('\n');
    }
    out
}

pub fn itinerary(view: &WizardView<'_>) -> String {
    let mut out = String::new();
    let Some(selected) = view.selected else {
        return out;
    };
    let _ = writeln!(out, "\n{}\n", selected.label());
    if let Some(overview) = view.trip_overview() {
        let _ = writeln!(out, "{}\n", overview);
    }
    let Some(itinerary) = selected.itinerary.as_ref() else {
        return out;
    };

    out.push_str(&budget(itinerary, view.preferences.budget_per_person()));
    out.push_str(&requirements(&itinerary.requirements));
    if itinerary.days.is_empty() {
        out.push_str("No days planned.\n");
    }
    for day in &itinerary.days {
        out.push_str(&day_plan(day));
    }
    if !itinerary.locations.is_empty() {
        out.push_str("Places on the map\n");
        for location in &itinerary.locations {
            let (lat, lon) = location.coordinates;
            let _ = writeln!(
                out,
                "  - {} [{}] ({:.4}, {:.4})",
                location.name, location.category, lat, lon
            );
        }
        out.push('\n');
    }
    if let Some(link) = view.share_link {
        let _ = writeln!(out, "Share this trip: {}", link);
    }
    out
}

fn budget(itinerary: &Itinerary, per_person: u32) -> String {
    let mut out = String::from("Budget breakdown\n");
    for (name, amount) in itinerary.budget.categories() {
        let _ = writeln!(out, "  {:<15} ${:>9.0}", name, amount);
    }
    let total = itinerary.budget.total();
    let remaining = itinerary.budget.remaining(per_person);
    let _ = writeln!(out, "  {:<15} ${:>9.0}", "Total", total);
    if remaining >= 0.0 {
        let _ = writeln!(out, "  {:<15} ${:>9.0}\n", "Remaining", remaining);
    } else {
        let _ = writeln!(out, "  {:<15} ${:>9.0}\n", "Over budget", -remaining);
    }
    out
}

fn requirements(req: &TravelRequirements) -> String {
    if req.is_empty() {
        return String::new();
    }
    let mut out = String::from("Travel requirements\n");
    for (title, items) in [
        ("Visas", &req.visas),
        ("Vaccinations", &req.vaccinations),
        ("Currency", &req.currency_tips),
        ("Customs", &req.customs),
    ] {
        for item in items {
            let _ = writeln!(out, "  {}: {}", title, item);
        }
    }
    out.push('\n');
    out
}

fn day_plan(day: &DayPlan) -> String {
    let mut out = format!("Day {}\n", day.day);
    for activity in &day.activities {
        let _ = write!(out, "  * {}", activity.name);
        if !activity.duration.is_empty() {
            let _ = write!(out, " ({})", activity.duration);
        }
        out.push('\n');
        if !activity.description.is_empty() {
            let _ = writeln!(out, "    {}", activity.description);
        }
        for detail in &activity.details {
            let _ = writeln!(out, "    - {}", detail);
        }
        if let Some(tip) = &activity.tip {
            let _ = writeln!(out, "    Tip: {}", tip);
        }
    }
    let _ = writeln!(
        out,
        "  Meals: {} / {} / {}",
        day.meals.breakfast, day.meals.lunch, day.meals.dinner
    );
    let _ = writeln!(
        out,
        "  Getting around: {}   Staying at: {}",
        day.transportation, day.accommodation
    );
    let _ = writeln!(out, "  Estimated: ${:.0}\n", day.costs.total());
    out
}

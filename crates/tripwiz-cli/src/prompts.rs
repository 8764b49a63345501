// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::Result;
use chrono::{Month, NaiveDate};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use tripwiz_core::preferences::{MAX_BUDGET, MAX_TRIP_TYPES, MIN_BUDGET};
use tripwiz_core::wizard::PreferenceEvent;
use tripwiz_core::{Destination, TripType, Wizard, WizardError};

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

pub enum DetailsAction {
    Search,
    Back,
}

pub enum Pick {
    Destination(usize),
    Back,
    Quit,
}

pub enum ItineraryAction {
    Back,
    Quit,
}

/// Prints a recoverable wizard error and carries on.
pub fn report(result: Result<(), WizardError>) {
    if let Err(e) = result {
        eprintln!("! {}", e);
    }
}

/// Step 1: where from and what kind of trip.
pub fn basics(wizard: &mut Wizard, theme: &ColorfulTheme) -> Result<()> {
    let current = wizard.preferences().starting_point().to_string();
    let starting_point: String = Input::with_theme(theme)
        .with_prompt("Where are you starting from?")
        .with_initial_text(current)
        .interact_text()?;
    report(wizard.edit(PreferenceEvent::StartingPoint(starting_point)));

    let labels: Vec<&str> = TripType::ALL.iter().map(|t| t.label()).collect();
    let defaults: Vec<bool> = TripType::ALL
        .iter()
        .map(|t| wizard.preferences().trip_type().contains(*t))
        .collect();
    let chosen = MultiSelect::with_theme(theme)
        .with_prompt(format!("What kind of trip? (pick up to {MAX_TRIP_TYPES})"))
        .items(&labels)
        .defaults(&defaults)
        .interact()?;
    if chosen.len() > MAX_TRIP_TYPES {
        eprintln!("! Only the first {MAX_TRIP_TYPES} trip types were kept");
    }

    // Deselect first so the freed slots are available to new picks.
    for (i, tag) in TripType::ALL.into_iter().enumerate() {
        if defaults[i] && !chosen.contains(&i) {
            report(wizard.edit(PreferenceEvent::ToggleTripType(tag)));
        }
    }
    for (i, tag) in TripType::ALL.into_iter().enumerate() {
        if !defaults[i] && chosen.contains(&i) {
            report(wizard.edit(PreferenceEvent::ToggleTripType(tag)));
        }
    }

    report(wizard.next());
    Ok(())
}

/// Step 2: party size, timing, budget.
pub fn details(wizard: &mut Wizard, theme: &ColorfulTheme) -> Result<DetailsAction> {
    let travelers: u32 = Input::with_theme(theme)
        .with_prompt("How many travelers?")
        .default(wizard.preferences().travelers())
        .interact_text()?;
    report(wizard.edit(PreferenceEvent::Travelers(travelers)));

    let timing = Select::with_theme(theme)
        .with_prompt("When are you going?")
        .items(&["I'm flexible (pick a month)", "I have specific dates"])
        .default(usize::from(!wizard.preferences().dates().is_empty()))
        .interact()?;
    if timing == 0 {
        month_and_length(wizard, theme)?;
    } else {
        dates(wizard, theme)?;
    }

    let budget: u32 = Input::with_theme(theme)
        .with_prompt(format!("Budget per person in USD ({MIN_BUDGET}-{MAX_BUDGET})"))
        .default(wizard.preferences().budget_per_person())
        .interact_text()?;
    report(wizard.edit(PreferenceEvent::Budget(budget)));
    println!(
        "  Approximately ${} per day",
        wizard.preferences().daily_budget()
    );

    let international = Confirm::with_theme(theme)
        .with_prompt("Open to international travel?")
        .default(wizard.preferences().is_international())
        .interact()?;
    report(wizard.edit(PreferenceEvent::International(international)));

    let action = Select::with_theme(theme)
        .items(&["Find adventures", "Back"])
        .default(0)
        .interact()?;
    Ok(match action {
        0 => DetailsAction::Search,
        _ => DetailsAction::Back,
    })
}

fn month_and_length(wizard: &mut Wizard, theme: &ColorfulTheme) -> Result<()> {
    report(wizard.edit(PreferenceEvent::ClearDates));

    let mut items = vec!["Any month"];
    items.extend(MONTHS.iter().map(|m| m.name()));
    let current = wizard
        .preferences()
        .month()
        .map(|m| m.number_from_month() as usize)
        .unwrap_or(0);
    let picked = Select::with_theme(theme)
        .with_prompt("Which month?")
        .items(&items)
        .default(current)
        .interact()?;
    let month = picked.checked_sub(1).map(|i| MONTHS[i]);
    report(wizard.edit(PreferenceEvent::Month(month)));

    let days: u32 = Input::with_theme(theme)
        .with_prompt("How many days?")
        .default(wizard.preferences().duration_days())
        .validate_with(|d: &u32| if *d >= 1 { Ok(()) } else { Err("at least one day") })
        .interact_text()?;
    report(wizard.edit(PreferenceEvent::Duration(days)));
    Ok(())
}

fn dates(wizard: &mut Wizard, theme: &ColorfulTheme) -> Result<()> {
    let range = wizard.preferences().dates();
    let mut start_prompt = Input::<NaiveDate>::with_theme(theme).with_prompt("Start date (YYYY-MM-DD)");
    if let Some(start) = range.start {
        start_prompt = start_prompt.default(start);
    }
    let start = start_prompt.interact_text()?;
    report(wizard.edit(PreferenceEvent::StartDate(start)));

    let end: NaiveDate = Input::with_theme(theme)
        .with_prompt("End date (YYYY-MM-DD)")
        .default(wizard.preferences().dates().end.unwrap_or(start))
        .interact_text()?;
    report(wizard.edit(PreferenceEvent::EndDate(end)));
    if end < start {
        eprintln!("! End date moved to {start}");
    }
    println!("  {} days", wizard.preferences().duration_days());
    Ok(())
}

pub fn pick_destination(destinations: &[Destination], theme: &ColorfulTheme) -> Result<Pick> {
    let mut items: Vec<String> = destinations.iter().map(Destination::label).collect();
    items.push("Back".to_string());
    items.push("Quit".to_string());
    let picked = Select::with_theme(theme)
        .with_prompt("Pick a destination to see its itinerary")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(match picked {
        i if i < destinations.len() => Pick::Destination(i),
        i if i == destinations.len() => Pick::Back,
        _ => Pick::Quit,
    })
}

pub fn after_itinerary(theme: &ColorfulTheme) -> Result<ItineraryAction> {
    let picked = Select::with_theme(theme)
        .items(&["Back to recommendations", "Quit"])
        .default(1)
        .interact()?;
    Ok(match picked {
        0 => ItineraryAction::Back,
        _ => ItineraryAction::Quit,
    })
}

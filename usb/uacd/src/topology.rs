//! Clock domains.
//!
//! Audio 1.0 has no clock entities: a stream simply runs at whatever rate its endpoint was told.
//! Audio 2.0 requires every terminal to name the clock driving it, so the clocks are inferred
//! here after parsing.

use crate::entity::{ClockSource, Entity, EntityKind, EntityList};
use crate::error::ParseError;
use crate::model::FormatTypeDescriptor;
use crate::uac::v2;

/// Gives every terminal a clock.
///
/// Each Input Terminal without a clock gets a new Clock Source. An Output Terminal shares the
/// clock of the first Input Terminal found upstream on its signal path, and gets a new Clock
/// Source only when there is none. New clocks take the id after the current maximum and are
/// appended to the list. Terminals that already have a clock are left alone, so a second call
/// changes nothing.
pub fn link_clocks(entities: &mut EntityList) -> Result<(), ParseError> {
    let inputs: Vec<u8> = unclocked(entities, |kind| {
        matches!(kind, EntityKind::InputTerminal(_))
    });
    for id in inputs {
        let clock = add_clock_source(entities, id)?;
        set_clock(entities, id, clock);
    }

    let outputs: Vec<u8> = unclocked(entities, |kind| {
        matches!(kind, EntityKind::OutputTerminal(_))
    });
    for id in outputs {
        let clock = match upstream_clock(entities, id) {
            Some(clock) => clock,
            None => add_clock_source(entities, id)?,
        };
        set_clock(entities, id, clock);
    }
    Ok(())
}

fn unclocked(entities: &EntityList, filter: impl Fn(&EntityKind) -> bool) -> Vec<u8> {
    entities
        .iter()
        .filter(|entity| filter(&entity.kind) && entity.clock_id().is_none())
        .map(|entity| entity.id)
        .collect()
}

fn set_clock(entities: &mut EntityList, terminal: u8, clock: u8) {
    if let Some(entity) = entities.get_mut(terminal) {
        log::debug!("terminal {} clocked by {}", terminal, clock);
        entity.set_clock_id(clock);
    }
}

/// Breadth-first walk over the source pins of `terminal`, first pin first.
fn upstream_clock(entities: &EntityList, terminal: u8) -> Option<u8> {
    let mut visited = [false; 256];
    let mut queue = std::collections::VecDeque::new();
    queue.push_back(terminal);
    visited[usize::from(terminal)] = true;

    while let Some(id) = queue.pop_front() {
        let entity = match entities.get(id) {
            Some(entity) => entity,
            None => continue,
        };
        if let EntityKind::InputTerminal(it) = &entity.kind {
            if let Some(clock) = it.clock_id {
                return Some(clock);
            }
        }
        for source in entity.source_ids() {
            if !visited[usize::from(source)] {
                visited[usize::from(source)] = true;
                queue.push_back(source);
            }
        }
    }
    None
}

fn add_clock_source(entities: &mut EntityList, terminal: u8) -> Result<u8, ParseError> {
    let id = match entities.max_id() {
        Some(max) => max.checked_add(1).ok_or(ParseError::EntityIdsExhausted)?,
        None => 1,
    };
    let interface_number = entities
        .get(terminal)
        .map(|entity| entity.interface_number)
        .unwrap_or(0);
    entities.push(Entity {
        id,
        descriptor_subtype: v2::CLOCK_SOURCE,
        interface_number,
        string_index: 0,
        kind: EntityKind::ClockSource(ClockSource {
            ranges: Vec::new(),
            current_frequency: 0,
            assoc_terminal: terminal,
        }),
    })?;
    Ok(id)
}

/// Adds the sampling rates of a stream format to the clock driving it.
///
/// Exact duplicates are dropped. The first range registered on an empty clock sets its current
/// frequency to that range's minimum.
pub fn register_stream_rates(clock: &mut ClockSource, format: &FormatTypeDescriptor) {
    for range in format.frequency_ranges() {
        if clock.ranges.contains(&range) {
            continue;
        }
        if clock.ranges.is_empty() {
            clock.current_frequency = range.min;
        }
        clock.ranges.push(range);
    }
}

/// Whether `frequency` lies within one of the clock's ranges, bounds included.
///
/// The resolution of a range is informational and not enforced as a step.
pub fn is_frequency_supported(clock: &ClockSource, frequency: u32) -> bool {
    clock.ranges.iter().any(|range| range.contains(frequency))
}

//! Demonstration feed used when no scraped meta.json is reachable.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use std::path::Path;

use crate::{Augment, AugmentTier, Champion, Composition, MetaDocument, MetaMetadata, OptimalItem};

const DEMO_PATCH: &str = "14.5";

fn champ(name: &str, cost: u32, traits: &[&str]) -> Champion {
    Champion {
        name: name.to_string(),
        cost,
        traits: strings(traits),
        is_carry: false,
        items: Vec::new(),
    }
}

fn carry(name: &str, cost: u32, traits: &[&str], items: &[&str]) -> Champion {
    Champion {
        is_carry: true,
        items: strings(items),
        ..champ(name, cost, traits)
    }
}

fn augment(name: &str, tier: AugmentTier, priority: u32) -> Augment {
    Augment {
        name: name.to_string(),
        description: None,
        tier,
        priority,
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Item builds are derived from the carries, in carry order
fn with_item_builds(mut comp: Composition) -> Composition {
    comp.optimal_items = comp
        .main_carries
        .iter()
        .enumerate()
        .map(|(i, c)| OptimalItem {
            champion_name: c.name.clone(),
            items: c.items.clone(),
            priority: i as u32 + 1,
        })
        .collect();
    comp
}

struct Stats {
    play_rate: f64,
    win_rate: f64,
    avg_placement: f64,
}

#[allow(clippy::too_many_arguments)]
fn composition(
    id: &str,
    name: &str,
    tier: &str,
    difficulty: u8,
    main_carries: Vec<Champion>,
    support_champions: Vec<Champion>,
    best_augments: Vec<Augment>,
    traits: &[&str],
    stats: Stats,
    timestamp: &str,
) -> Composition {
    with_item_builds(Composition {
        id: Some(id.to_string()),
        name: name.to_string(),
        tier: tier.to_string(),
        difficulty: Some(difficulty),
        main_carries,
        support_champions,
        optimal_items: Vec::new(),
        best_augments,
        traits: strings(traits),
        play_rate: Some(stats.play_rate),
        win_rate: Some(stats.win_rate),
        avg_placement: Some(stats.avg_placement),
        patch_version: Some(DEMO_PATCH.to_string()),
        last_updated: Some(timestamp.to_string()),
    })
}

pub fn demo_compositions() -> Vec<Composition> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    vec![
        composition(
            "comp-1",
            "True Damage Reroll",
            "S",
            3,
            vec![
                carry("Akali", 4, &["True Damage", "Sentinel"], &["Infinity Edge", "Last Whisper", "Bloodthirster"]),
                carry("Yasuo", 5, &["True Damage", "Invoker"], &["Rabadon's Deathcap", "Jeweled Gauntlet", "Archangel's Staff"]),
            ],
            vec![
                champ("Senna", 2, &["True Damage", "Sentinel"]),
                champ("Katarina", 3, &["True Damage", "Academy"]),
                champ("Lucian", 2, &["Sentinel", "Cannoneer"]),
                champ("Viego", 4, &["Caretaker", "Sentinel"]),
            ],
            vec![
                augment("True Damage Crown", AugmentTier::Prismatic, 1),
                augment("Combat Training I", AugmentTier::Silver, 2),
                augment("Cybernetic Implants II", AugmentTier::Silver, 3),
            ],
            &["True Damage", "Sentinel", "Invoker", "Academy"],
            Stats { play_rate: 12.5, win_rate: 67.8, avg_placement: 3.2 },
            &now,
        ),
        composition(
            "comp-2",
            "Punk Highroll",
            "A",
            4,
            vec![carry("Jinx", 4, &["Punk", "Rapidfire"], &["Rapid Firecannon", "Infinity Edge", "Last Whisper"])],
            vec![
                champ("Vi", 2, &["Punk", "Bruiser"]),
                champ("Ekko", 3, &["Punk", "Prankster"]),
                champ("Graves", 1, &["Bruiser", "Cannoneer"]),
                champ("Sylas", 3, &["Misfits", "Brawler"]),
            ],
            vec![
                augment("Punk Rock", AugmentTier::Gold, 1),
                augment("Rich Get Richer+", AugmentTier::Gold, 2),
                augment("Combat Training I", AugmentTier::Silver, 3),
            ],
            &["Punk", "Rapidfire", "Bruiser", "Misfits"],
            Stats { play_rate: 8.3, win_rate: 59.2, avg_placement: 3.8 },
            &now,
        ),
        composition(
            "comp-3",
            "Anima Squad Fast 9",
            "A",
            5,
            vec![carry("Miss Fortune", 5, &["Anima Squad", "Ace"], &["Giant Slayer", "Last Whisper", "Infinity Edge"])],
            vec![
                champ("Sylas", 3, &["Misfits", "Brawler"]),
                champ("Lucian", 2, &["Sentinel", "Cannoneer"]),
                champ("Garen", 1, &["Elite", "Defender"]),
                champ("Fiora", 1, &["Elite", "Challenger"]),
            ],
            vec![
                augment("Golden Ticket", AugmentTier::Prismatic, 1),
                augment("Big Friend", AugmentTier::Prismatic, 2),
                augment("Academy Emblem", AugmentTier::Silver, 3),
            ],
            &["Anima Squad", "Ace", "Elite", "Sentinel"],
            Stats { play_rate: 6.7, win_rate: 71.4, avg_placement: 2.9 },
            &now,
        ),
        composition(
            "comp-4",
            "Elite Frontline",
            "B",
            2,
            vec![carry("Garen", 1, &["Elite", "Defender"], &["Warmog's Armor", "Bramble Vest", "Ionic Spark"])],
            vec![
                champ("Fiora", 1, &["Elite", "Challenger"]),
                champ("Twisted Fate", 1, &["Pirate", "Invoker"]),
                champ("Gangplank", 2, &["Pirate", "Bruiser"]),
            ],
            vec![
                augment("Academy Emblem", AugmentTier::Silver, 1),
                augment("Cybernetic Implants II", AugmentTier::Silver, 2),
                augment("Sentinel Unity", AugmentTier::Gold, 3),
            ],
            &["Elite", "Defender", "Pirate", "Challenger"],
            Stats { play_rate: 15.2, win_rate: 45.8, avg_placement: 4.2 },
            &now,
        ),
        composition(
            "comp-5",
            "Sentinel Scaling",
            "A",
            3,
            vec![
                carry("Lucian", 2, &["Sentinel", "Cannoneer"], &["Runaan's Hurricane", "Rapid Firecannon", "Bloodthirster"]),
                carry("Senna", 2, &["True Damage", "Sentinel"], &["Rabadon's Deathcap", "Morellonomicon", "Archangel's Staff"]),
            ],
            vec![
                champ("Viego", 4, &["Caretaker", "Sentinel"]),
                champ("Akali", 4, &["True Damage", "Sentinel"]),
            ],
            vec![
                augment("Sentinel Unity", AugmentTier::Gold, 1),
                augment("Gadgeteen Heart", AugmentTier::Gold, 2),
                augment("Combat Training I", AugmentTier::Silver, 3),
            ],
            &["Sentinel", "True Damage", "Cannoneer", "Caretaker"],
            Stats { play_rate: 9.8, win_rate: 62.1, avg_placement: 3.5 },
            &now,
        ),
    ]
}

pub fn demo_meta() -> MetaDocument {
    let compositions = demo_compositions();
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    MetaDocument {
        version: Some("1.0.0".to_string()),
        last_updated: Some(now.clone()),
        total_compositions: Some(compositions.len()),
        compositions,
        metadata: Some(MetaMetadata {
            scraped_from: "demo-data-generator".to_string(),
            scraping_date: now,
            patch_version: Some(DEMO_PATCH.to_string()),
        }),
    }
}

/// Write the demo feed as pretty JSON, creating parent directories
pub fn write_demo_meta(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&demo_meta()).context("Failed to encode demo meta")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Wrote demo meta to {}", path.display());
    Ok(())
}

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Value};
use shared::{validate_part_data, NewPart, PartCategory, PartType};
use sqlx::SqlitePool;

const PART_NAMES: &[&str] = &[
    "Drive Gear",
    "Mounting Bracket",
    "Support Frame",
    "Control Panel",
    "Precision Shaft",
    "Bearing Block",
    "Intake Roller",
    "Chassis Rail",
    "Motor Plate",
    "Elevator Carriage",
    "Shooter Hood",
    "Bumper Mount",
    "Gusset",
    "Spacer",
    "Pivot Arm",
];

const SUBSYSTEMS: &[&str] = &[
    "Drive System",
    "Intake",
    "Elevator",
    "Shooter",
    "Climber",
    "Chassis",
    "Electrical",
];

const ASSIGNEES: &[&str] = &["John Doe", "Jane Smith", "Bob Johnson", "Ana Lima", "Sam Lee"];

const MATERIALS: &[&str] = &["6061-T6", "7075", "Polycarbonate", "Delrin", "Steel"];

const FILE_EXTENSIONS: &[&str] = &["stl", "step", "dwg"];

/// A seed record plus how many days ago it was claimed, if at all
pub struct SeedPart {
    pub payload: Value,
    pub claimed_days_ago: Option<i64>,
}

impl SeedPart {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            claimed_days_ago: None,
        }
    }

    fn claimed(payload: Value, days_ago: i64) -> Self {
        Self {
            payload,
            claimed_days_ago: Some(days_ago),
        }
    }
}

/// The five parts every development database starts with
pub fn sample_parts() -> Vec<SeedPart> {
    vec![
        SeedPart::new(json!({
            "type": "cnc",
            "name": "Drive Gear",
            "status": "Pending",
            "notes": "Check tooth profile",
            "file": "gear.stl",
            "onshape_url": "",
            "category": "review",
        })),
        SeedPart::claimed(
            json!({
                "type": "cnc",
                "name": "Mounting Bracket",
                "status": "Approved",
                "notes": "High precision required",
                "file": "bracket.stl",
                "onshape_url": "",
                "category": "cnc",
                "assigned": "John Doe",
            }),
            2,
        ),
        SeedPart::claimed(
            json!({
                "type": "hand",
                "name": "Support Frame",
                "status": "In Progress",
                "notes": "Weld assembly required",
                "file": "frame.dwg",
                "onshape_url": "",
                "category": "hand",
                "assigned": "Jane Smith",
            }),
            1,
        ),
        SeedPart::new(json!({
            "type": "hand",
            "name": "Control Panel",
            "status": "Completed",
            "notes": "Assembly completed and tested",
            "file": "panel.dwg",
            "onshape_url": "",
            "category": "completed",
            "assigned": "Bob Johnson",
        })),
        SeedPart::new(json!({
            "type": "cnc",
            "name": "Precision Shaft",
            "status": "Pending",
            "notes": "Tight tolerances",
            "file": "shaft.stl",
            "onshape_url": "",
            "category": "review",
            "subsystem": "Drive System",
        })),
    ]
}

/// Random parts with a consistent type/category/status combination
pub fn generated_parts(count: usize, rng: &mut StdRng) -> Vec<SeedPart> {
    (0..count)
        .map(|i| {
            let part_type = *[PartType::Cnc, PartType::Hand]
                .choose(rng)
                .unwrap_or(&PartType::Cnc);
            let category = match rng.gen_range(0..4) {
                0 => PartCategory::Review,
                1 => PartCategory::Completed,
                _ if part_type == PartType::Cnc => PartCategory::Cnc,
                _ => PartCategory::Hand,
            };
            let status = match category {
                PartCategory::Review => "Pending",
                PartCategory::Completed => "Completed",
                _ => "In Progress",
            };

            let name = PART_NAMES.choose(rng).copied().unwrap_or("Part");
            let ext = FILE_EXTENSIONS.choose(rng).copied().unwrap_or("stl");
            let mut payload = json!({
                "type": part_type.as_str(),
                "name": format!("{} {}", name, i + 1),
                "part_id": format!("P-{:04}", rng.gen_range(1..10_000)),
                "subsystem": SUBSYSTEMS.choose(rng).copied(),
                "status": status,
                "file": format!("{}.{}", name.to_lowercase().replace(' ', "_"), ext),
                "onshape_url": format!("https://cad.onshape.com/documents/{:016x}", rng.gen::<u64>()),
                "amount": rng.gen_range(1..=12),
                "category": category.as_str(),
                "misc_info": {
                    "material": MATERIALS.choose(rng).copied(),
                    "thickness_mm": rng.gen_range(1..=25),
                },
            });

            let claimed = (category != PartCategory::Review).then(|| rng.gen_range(0..14));
            if claimed.is_some() {
                payload["assigned"] = json!(ASSIGNEES.choose(rng).copied());
            }
            SeedPart {
                payload,
                claimed_days_ago: claimed,
            }
        })
        .collect()
}

/// Run a raw record through the same validation the API uses
pub fn prepare(seed: &SeedPart) -> Result<NewPart> {
    let raw = seed
        .payload
        .as_object()
        .ok_or_else(|| anyhow!("seed records must be JSON objects"))?;
    let changes = validate_part_data(raw)
        .map_err(|err| anyhow!("invalid seed record {}: {}", seed.payload, err))?;
    let mut part = changes
        .into_new_part()
        .map_err(|err| anyhow!("invalid seed record {}: {}", seed.payload, err))?;
    part.claimed_date = seed
        .claimed_days_ago
        .map(|days| Utc::now() - Duration::days(days));
    Ok(part)
}

pub async fn insert_parts(pool: &SqlitePool, seeds: &[SeedPart]) -> Result<usize> {
    let parts = seeds.iter().map(prepare).collect::<Result<Vec<_>>>()?;
    for part in &parts {
        parts_api::db::insert_part(pool, part)
            .await
            .with_context(|| format!("Failed to insert part {}", part.name))?;
    }
    Ok(parts.len())
}

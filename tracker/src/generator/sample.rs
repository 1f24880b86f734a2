use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

const SITES: [(&str, f64, f64); 6] = [
    ("Tokyo", 35.68, 139.69),
    ("Kathmandu", 27.71, 85.32),
    ("Lima", -12.05, -77.04),
    ("Anchorage", 61.22, -149.90),
    ("Istanbul", 41.01, 28.97),
    ("Wellington", -41.29, 174.78),
];
const HAZARDS: [&str; 3] = ["earthquake", "aftershock", "tremor"];
const BASE_TIMESTAMP_MS: i64 = 1_700_000_000_000;

/// Configuration for generating a synthetic bucket.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self { count: 4, seed: 0 }
    }
}

/// Counts of what a generated bucket contains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleSummary {
    pub documents: usize,
    pub detection_records: usize,
    pub direct_records: usize,
}

fn detection_document(rng: &mut StdRng, index: usize) -> Value {
    let records = rng.gen_range(1..=3);
    let items = (0..records)
        .map(|offset| {
            let (name, lat, lon) = SITES[rng.gen_range(0..SITES.len())];
            let hazard = HAZARDS[rng.gen_range(0..HAZARDS.len())];
            let minutes = (index * 3 + offset) as i64;
            json!({
                "location": name,
                "latitude": lat + rng.gen_range(-0.5..0.5),
                "longitude": lon + rng.gen_range(-0.5..0.5),
                "hazardType": hazard,
                "timestamp": BASE_TIMESTAMP_MS + minutes * 60_000,
                "predictions": [{"confidence": rng.gen_range(0.5..0.99)}],
            })
        })
        .collect::<Vec<_>>();
    Value::Array(items)
}

fn direct_document(rng: &mut StdRng, index: usize) -> Value {
    json!({
        "af": rng.gen_range(0..100),
        "iif": rng.gen_range(0..100),
        "data_from": format!("esp32-{}", index),
    })
}

/// Builds `(key, body)` pairs: `detections/<n>.json` arrays and `esp32/<n>.json` objects.
pub fn build_sample_objects(config: &SampleConfig) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut objects = Vec::with_capacity(config.count * 2);

    for index in 0..config.count {
        let detections = serde_json::to_vec_pretty(&detection_document(&mut rng, index))
            .context("encoding sample detection document")?;
        objects.push((format!("detections/{}.json", index), detections));

        let direct = serde_json::to_vec_pretty(&direct_document(&mut rng, index))
            .context("encoding sample direct document")?;
        objects.push((format!("esp32/{}.json", index), direct));
    }

    Ok(objects)
}

/// Writes a generated bucket under `root`, one file per key.
pub fn write_sample_bucket(root: &Path, config: &SampleConfig) -> anyhow::Result<SampleSummary> {
    let mut summary = SampleSummary::default();

    for (key, body) in build_sample_objects(config)? {
        let document: Value =
            serde_json::from_slice(&body).context("re-reading generated document")?;
        let records = document.as_array().map(Vec::len).unwrap_or(1);
        if key.starts_with("detections/") {
            summary.detection_records += records;
        } else {
            summary.direct_records += records;
        }

        let path = root.join(&key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&path, &body).with_context(|| format!("writing {}", path.display()))?;
        summary.documents += 1;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn generator_emits_two_documents_per_index() {
        let objects = build_sample_objects(&SampleConfig { count: 3, seed: 1 }).unwrap();
        let keys = objects.iter().map(|(key, _)| key.as_str()).collect::<Vec<_>>();
        assert_eq!(
            keys,
            vec![
                "detections/0.json",
                "esp32/0.json",
                "detections/1.json",
                "esp32/1.json",
                "detections/2.json",
                "esp32/2.json",
            ]
        );
    }

    #[test]
    fn same_seed_repeats_the_bucket() {
        let config = SampleConfig { count: 2, seed: 13 };
        assert_eq!(
            build_sample_objects(&config).unwrap(),
            build_sample_objects(&config).unwrap()
        );
    }

    #[test]
    fn written_bucket_matches_summary() {
        let dir = TempDir::new().unwrap();
        let summary = write_sample_bucket(dir.path(), &SampleConfig { count: 2, seed: 5 }).unwrap();
        assert_eq!(summary.documents, 4);
        assert_eq!(summary.direct_records, 2);
        assert!((2..=6).contains(&summary.detection_records));
        assert!(dir.path().join("detections/1.json").exists());
    }
}

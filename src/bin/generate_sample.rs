//! Generate a deterministic sample movie CSV for offline use:
//! `cargo run --bin generate_sample -- [output.csv]`
//!
//! The output includes a few incomplete rows and one duplicate so the
//! dashboard's data-quality report has something to show.

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const GENRES: [&str; 6] = ["Action", "Comedy", "Drama", "Horror", "Sci-Fi", "Thriller"];
const COUNTRIES: [&str; 5] = [
    "United States",
    "United Kingdom",
    "France",
    "Japan",
    "South Korea",
];

fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "movies_sample.csv".to_string());

    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {path}"))?;

    writer.write_record(["name", "genre", "year", "country", "score", "runtime", "budget"])?;

    for i in 0..200 {
        let name = format!("Movie {i:03}");
        let genre = rng.pick(&GENRES);
        let year = 2000 + (rng.next_u64() % 24) as i32;
        let country = rng.pick(&COUNTRIES);
        let score = (rng.range_f64(1.0, 10.0) * 10.0).round() / 10.0;
        let runtime = rng.range_f64(70.0, 180.0).round();
        let budget = (rng.range_f64(0.2, 200.0) * 1_000_000.0).round();

        // Every 17th row loses a field so the cleaner has work to do.
        let (score_cell, runtime_cell) = if i % 17 == 0 {
            if i % 2 == 0 {
                (String::new(), runtime.to_string())
            } else {
                (score.to_string(), String::new())
            }
        } else {
            (score.to_string(), runtime.to_string())
        };

        let record = [
            name,
            genre.to_string(),
            year.to_string(),
            country.to_string(),
            score_cell,
            runtime_cell,
            budget.to_string(),
        ];
        writer.write_record(&record)?;

        // One exact duplicate near the start.
        if i == 3 {
            writer.write_record(&record)?;
        }
    }

    writer.flush().context("flushing CSV")?;
    println!("wrote {path}");
    Ok(())
}

use fixelevs::{
    CorrectionMethod, ElevationPoint, Error, ReachPoint, bank4flood, correct_reaches,
    extract_bank_elevations, group_reaches,
};

/// Small deterministic generator so profiles are reproducible without extra crates
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Downstream-sloping profile with noise and occasional bumps
    fn noisy_profile(&mut self, len: usize) -> Vec<f64> {
        let mut z = 100.0 + self.next_f64() * 50.0;
        (0..len)
            .map(|_| {
                z -= self.next_f64() * 0.5;
                let noise = (self.next_f64() - 0.5) * 3.0;
                let bump = if self.next_f64() < 0.05 { 10.0 } else { 0.0 };
                ((z + noise + bump) * 100.0).round() / 100.0
            })
            .collect()
    }
}

fn is_non_increasing(v: &[f64]) -> bool {
    v.windows(2).all(|w| w[1] <= w[0])
}

#[test]
fn test_random_profiles_keep_length_and_become_monotone() {
    let mut rng = Lcg(7);
    for len in [1, 2, 3, 5, 17, 64, 250] {
        for _ in 0..20 {
            let dem = rng.noisy_profile(len);
            let adjusted = bank4flood(&dem).unwrap();
            assert_eq!(adjusted.len(), dem.len());
            assert!(is_non_increasing(&adjusted), "{:?} -> {:?}", dem, adjusted);
        }
    }
}

#[test]
fn test_random_profiles_are_fixed_points() {
    let mut rng = Lcg(42);
    for _ in 0..50 {
        let dem = rng.noisy_profile(40);
        let once = bank4flood(&dem).unwrap();
        assert_eq!(bank4flood(&once).unwrap(), once);
    }
}

#[test]
fn test_values_come_from_the_profile() {
    // Every repaired level is one of the window's own values
    let mut rng = Lcg(3);
    for _ in 0..30 {
        let dem = rng.noisy_profile(30);
        let adjusted = bank4flood(&dem).unwrap();
        for z in &adjusted {
            assert!(dem.contains(z), "{} not in {:?}", z, dem);
        }
    }
}

#[test]
fn test_monotone_input_unchanged() {
    let dem = [10.0, 9.0, 8.0, 7.0];
    assert_eq!(bank4flood(&dem).unwrap(), dem.to_vec());
    let flat_steps = [5.0, 5.0, 4.0, 4.0, 4.0, 1.0];
    assert_eq!(bank4flood(&flat_steps).unwrap(), flat_steps.to_vec());
}

#[test]
fn test_empty_profile_is_value_error() {
    assert!(matches!(bank4flood(&[]), Err(Error::Value(_))));
    assert!(matches!(
        CorrectionMethod::Yamazaki.correct(&[]),
        Err(Error::Value(_))
    ));
}

#[test]
fn test_assembled_output_covers_every_row() {
    let mut rng = Lcg(11);
    let mut rows = Vec::new();
    for i in 0..300 {
        let reach = (rng.next_f64() * 12.0) as i64;
        let z = 50.0 + rng.next_f64() * 5.0;
        rows.push(ReachPoint::new(i as f64, 0.0, reach, Some(z)));
    }
    let reaches = group_reaches(&rows);
    let total: usize = reaches.iter().map(|r| r.len()).sum();
    assert_eq!(total, rows.len());

    let out = correct_reaches(&rows, CorrectionMethod::Yamazaki).unwrap();
    assert_eq!(out.len(), rows.len());
    for (rp, cp) in rows.iter().zip(&out) {
        assert_eq!((rp.lon, rp.lat), (cp.x, cp.y));
    }
    for reach in &reaches {
        let profile: Vec<f64> = reach.rows.iter().map(|&r| out[r].elevadj).collect();
        assert!(is_non_increasing(&profile), "reach {}: {:?}", reach.id, profile);
    }
}

#[test]
fn test_single_source_point_matches_everything() {
    let source = [ElevationPoint::new(-3.0, 51.0, 18.75)];
    let rows: Vec<ReachPoint> = (0..10)
        .map(|i| ReachPoint::new(i as f64 * 1000.0, -(i as f64), 1, None))
        .collect();
    let bnk = extract_bank_elevations(&source, &rows).unwrap();
    assert!(bnk.iter().all(|&z| z == 18.75));
}

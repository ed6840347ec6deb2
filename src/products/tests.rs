// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use num_complex::Complex;

use super::*;

#[test]
fn test_new_products_are_fully_flagged() {
    let p = CorrProducts::new(3, 16, 2);
    assert_eq!(p.beam, 2);
    assert_eq!(p.num_antennas(), 3);
    assert_eq!(p.num_baselines(), 3);
    assert_eq!(p.num_channels(), 16);
    assert_eq!(p.uvw.dim(), (3, 3));
    assert!(p.is_fully_flagged());
    assert_eq!(p.num_unflagged(), 0);
    assert!(p.mean_unflagged_amplitude().is_none());
}

#[test]
fn test_init_resets_everything() {
    let mut p = CorrProducts::new(4, 8, 0);
    p.visibilities.fill(Complex::new(1.0, -1.0));
    p.flags.fill(false);
    p.uvw.fill(100.0);
    p.delays.fill(1e-9);
    p.bat = 5;

    p.init(1234);
    assert_eq!(p.bat, 1234);
    assert_eq!(p.beam, 0);
    assert!(p.is_fully_flagged());
    assert!(p.visibilities.iter().all(|v| *v == Complex::default()));
    assert!(p.uvw.iter().all(|&u| u == 0.0));
    assert!(p.delays.iter().all(|&d| d == 0.0));
}

#[test]
fn test_mean_unflagged_amplitude_ignores_flagged_samples() {
    let mut p = CorrProducts::new(2, 4, 0);
    // One baseline, four channels.
    p.visibilities[(0, 0)] = Complex::new(3.0, 4.0);
    p.flags[(0, 0)] = false;
    p.visibilities[(0, 1)] = Complex::new(0.0, 1.0);
    p.flags[(0, 1)] = false;
    // Flagged, so must not count.
    p.visibilities[(0, 2)] = Complex::new(100.0, 0.0);

    assert_eq!(p.num_unflagged(), 2);
    assert!(!p.is_fully_flagged());
    let mean = p.mean_unflagged_amplitude().unwrap();
    assert_abs_diff_eq!(mean, 3.0);
}

#[test]
fn test_baseline_counts() {
    assert_eq!(num_cross_baselines(0), 0);
    assert_eq!(num_cross_baselines(1), 0);
    assert_eq!(num_cross_baselines(3), 3);
    assert_eq!(num_cross_baselines(36), 630);
}

#[test]
fn test_baseline_ordering() {
    let n = 4;
    let expected = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];
    for (i_bl, &(a1, a2)) in expected.iter().enumerate() {
        assert_eq!(antennas_to_baseline(a1, a2, n), Some(i_bl));
        // Order of the antennas doesn't matter.
        assert_eq!(antennas_to_baseline(a2, a1, n), Some(i_bl));
    }
}

#[test]
fn test_invalid_baselines() {
    assert_eq!(antennas_to_baseline(1, 1, 3), None);
    assert_eq!(antennas_to_baseline(0, 3, 3), None);
    assert_eq!(antennas_to_baseline(0, 1, 1), None);
}

#[test]
fn test_baselines_are_numbered_in_order() {
    let n = 36;
    let mut expected = 0;
    for a1 in 0..n {
        for a2 in a1 + 1..n {
            assert_eq!(antennas_to_baseline(a1, a2, n), Some(expected));
            expected += 1;
        }
    }
    assert_eq!(expected, num_cross_baselines(n));
}

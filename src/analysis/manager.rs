//! The region set of a loaded waveform.
//!
//! `RegionSet` is the single owner of the regions. It rebuilds them on every
//! load, converts user-unit parameter updates to SI once and broadcasts them,
//! and answers the aggregate and point queries the presentation layer needs.

use tracing::{debug, info};

use crate::analysis::region::{Region, Span};
use crate::analysis::segment::{Segmentation, segment};
use crate::domain::{CellInputs, Direction, MeanValues, Point};
use crate::error::{LoadError, QueryError, SegmentError};
use crate::math::mean;
use crate::models::{CellParams, deg_to_rad, mm2_to_m2, nf_to_f, um_to_m};

/// What a call to `load_waveform` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Empty input: nothing acquired, state untouched.
    Skipped,
    Loaded { regions: usize },
}

#[derive(Debug, Clone, Default)]
pub struct RegionSet {
    regions: Vec<Region>,
    params: CellParams,
    loaded: bool,
}

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Region set whose parameters start from `inputs` (user units).
    pub fn with_inputs(inputs: &CellInputs) -> Self {
        Self {
            params: CellParams::from_inputs(inputs),
            ..Self::default()
        }
    }

    /// Segment the waveform and rebuild the regions.
    ///
    /// - empty input is a no-op (`LoadOutcome::Skipped`)
    /// - a segmentation failure leaves the previous regions in place
    /// - a region failure leaves the set cleared
    pub fn load_waveform(&mut self, time: &[f64], voltage: &[f64]) -> Result<LoadOutcome, LoadError> {
        if time.is_empty() || voltage.is_empty() {
            debug!("empty waveform, load skipped");
            return Ok(LoadOutcome::Skipped);
        }

        let segmentation = segment(time, voltage)?;
        self.load_segmentation(time, voltage, &segmentation)
    }

    /// Rebuild the regions from an existing segmentation of `(time, voltage)`.
    pub fn load_segmentation(
        &mut self,
        time: &[f64],
        voltage: &[f64],
        segmentation: &Segmentation,
    ) -> Result<LoadOutcome, LoadError> {
        check_segmentation(time, voltage, segmentation)?;
        self.clear();

        let regions = build_regions(time, voltage, segmentation, self.params)?;
        let count = regions.len();
        self.regions = regions;
        self.loaded = true;

        info!(regions = count, samples = time.len(), "waveform loaded");
        Ok(LoadOutcome::Loaded { regions: count })
    }

    pub fn clear(&mut self) {
        self.regions.clear();
        self.loaded = false;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Current cell parameters (SI).
    pub fn params(&self) -> &CellParams {
        &self.params
    }

    /// Apply all five parameters at once (user units).
    pub fn apply_inputs(&mut self, inputs: &CellInputs) {
        self.set_input_voltage(inputs.input_voltage);
        self.set_thickness(inputs.thickness_um);
        self.set_area(inputs.area_mm2);
        self.set_capacitance(inputs.capacitance_nf);
        self.set_tilt_angle(inputs.tilt_deg);
    }

    /// Drive amplitude in volts.
    pub fn set_input_voltage(&mut self, volts: f64) {
        self.params.input_voltage = volts;
        self.regions.iter_mut().for_each(|r| r.set_input_voltage(volts));
    }

    /// Cell thickness in micrometres.
    pub fn set_thickness(&mut self, um: f64) {
        let metres = um_to_m(um);
        self.params.thickness = metres;
        self.regions.iter_mut().for_each(|r| r.set_thickness(metres));
    }

    /// Electrode area in square millimetres.
    pub fn set_area(&mut self, mm2: f64) {
        let square_metres = mm2_to_m2(mm2);
        self.params.area = square_metres;
        self.regions.iter_mut().for_each(|r| r.set_area(square_metres));
    }

    /// Series capacitance in nanofarads.
    pub fn set_capacitance(&mut self, nf: f64) {
        let farads = nf_to_f(nf);
        self.params.capacitance = farads;
        self.regions.iter_mut().for_each(|r| r.set_capacitance(farads));
    }

    /// Tilt angle in degrees.
    pub fn set_tilt_angle(&mut self, deg: f64) {
        let radians = deg_to_rad(deg);
        self.params.tilt_angle = radians;
        self.regions.iter_mut().for_each(|r| r.set_tilt_angle(radians));
    }

    pub fn mean_polarization(&self) -> Result<f64, QueryError> {
        self.mean_of(Region::polarization)
    }

    pub fn mean_viscosity(&self) -> Result<f64, QueryError> {
        self.mean_of(Region::viscosity)
    }

    pub fn mean_anisotropy(&self) -> Result<f64, QueryError> {
        self.mean_of(Region::anisotropy)
    }

    /// All three means, or `NoRegions`.
    pub fn means(&self) -> Result<MeanValues, QueryError> {
        Ok(MeanValues {
            polarization: self.mean_polarization()?,
            viscosity: self.mean_viscosity()?,
            anisotropy: self.mean_anisotropy()?,
        })
    }

    fn mean_of(&self, f: impl Fn(&Region) -> f64) -> Result<f64, QueryError> {
        let values: Vec<f64> = self.regions.iter().map(f).collect();
        mean(&values).ok_or(QueryError::NoRegions)
    }

    /// `(start_time, end_time)` of every region in `direction`, in waveform order.
    pub fn regions_by_direction(&self, direction: Direction) -> Vec<(f64, f64)> {
        self.regions
            .iter()
            .filter(|r| r.direction() == direction)
            .map(Region::borders)
            .collect()
    }

    pub fn knee_points(&self) -> Vec<Point> {
        self.regions.iter().map(Region::knee_point).collect()
    }

    /// t40 and t60 of each region, interleaved.
    pub fn t40_t60_points(&self) -> Vec<Point> {
        self.regions
            .iter()
            .flat_map(|r| [r.t40_point(), r.t60_point()])
            .collect()
    }

    /// First region whose open interval contains `x`.
    pub fn region_at(&self, x: f64) -> Option<&Region> {
        self.regions.iter().find(|r| r.contains(x))
    }
}

/// The segmentation must come from a waveform of this length; the state is
/// left untouched otherwise.
fn check_segmentation(time: &[f64], voltage: &[f64], segmentation: &Segmentation) -> Result<(), LoadError> {
    if time.len() != voltage.len() {
        return Err(SegmentError::LengthMismatch {
            time: time.len(),
            voltage: voltage.len(),
        }
        .into());
    }
    let window_end = segmentation.windows.iter().map(|w| w.end).max().unwrap_or(0);
    if segmentation.derivative.len() != time.len() || window_end > time.len() {
        return Err(LoadError::SegmentationMismatch {
            samples: time.len(),
            segmented: segmentation.derivative.len().max(window_end),
        });
    }
    Ok(())
}

fn build_regions(
    time: &[f64],
    voltage: &[f64],
    segmentation: &Segmentation,
    params: CellParams,
) -> Result<Vec<Region>, LoadError> {
    let windows = &segmentation.windows;
    let mut regions = Vec::with_capacity(windows.len());

    for (index, window) in windows.iter().enumerate() {
        let range = window.start..window.end;
        let end_time = time
            .get(window.end)
            .or_else(|| time.last())
            .copied()
            .unwrap_or(f64::NAN);

        let span = Span {
            time: &time[range.clone()],
            voltage: &voltage[range.clone()],
            derivative: &segmentation.derivative[range],
            end_time,
        };
        let mut region = Region::new(span, window.direction).map_err(|source| LoadError::Region { index, source })?;
        region.set_params(params);

        debug!(
            index,
            direction = window.direction.label(),
            start = window.start,
            end = window.end,
            u_p = region.u_p(),
            tau = region.tau(),
            alpha = region.alpha(),
            "region extracted"
        );
        regions.push(region);
    }
    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synth::generate;
    use crate::domain::SynthSpec;
    use crate::error::RegionError;

    fn trapezoid() -> (Vec<f64>, Vec<f64>) {
        let time: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let voltage = (0..100)
            .map(|i| match i {
                0..=10 => 0.0,
                11..=20 => (i - 10) as f64,
                21..=80 => 10.0,
                81..=90 => (90 - i) as f64,
                _ => 0.0,
            })
            .collect();
        (time, voltage)
    }

    fn loaded_trapezoid() -> RegionSet {
        let (t, v) = trapezoid();
        let mut set = RegionSet::new();
        assert_eq!(set.load_waveform(&t, &v), Ok(LoadOutcome::Loaded { regions: 2 }));
        set
    }

    #[test]
    fn trapezoid_yields_rising_then_falling_region() {
        let set = loaded_trapezoid();
        assert!(set.is_loaded());

        let regions = set.regions();
        assert!(regions[0].is_increasing());
        assert!(!regions[1].is_increasing());
        for r in regions {
            assert!(r.u_p() > 0.0);
            assert!(r.tau() > 0.0);
        }

        let knee = regions[0].knee_point();
        assert!(knee.time >= 10.0 && knee.time <= 20.0);
        assert_eq!(set.regions_by_direction(Direction::Rising), vec![(10.0, 80.0)]);
        assert_eq!(set.regions_by_direction(Direction::Falling), vec![(80.0, 99.0)]);
    }

    #[test]
    fn region_at_picks_the_owning_region() {
        let set = loaded_trapezoid();
        assert!(set.region_at(15.0).is_some_and(Region::is_increasing));
        assert!(set.region_at(85.0).is_some_and(|r| !r.is_increasing()));
        assert!(set.region_at(5.0).is_none());
        assert!(set.region_at(10.0).is_none());
        assert!(set.region_at(150.0).is_none());
    }

    #[test]
    fn marker_lists_follow_region_order() {
        let set = loaded_trapezoid();
        let knees = set.knee_points();
        assert_eq!(knees, vec![Point::new(11.0, 1.0), Point::new(81.0, 9.0)]);

        let markers = set.t40_t60_points();
        assert_eq!(markers.len(), 4);
        assert!(markers[0].time <= markers[1].time);
        assert!(markers[2].time <= markers[3].time);
        assert!(markers[1].time < markers[2].time);
    }

    #[test]
    fn parameter_updates_are_stored_in_si() {
        let mut set = loaded_trapezoid();
        set.set_thickness(3.0);
        set.set_capacitance(30.0);
        set.set_tilt_angle(45.0);
        set.set_area(100.0);
        set.set_input_voltage(12.0);

        for r in set.regions() {
            let p = r.params();
            assert!((p.thickness - 3.0e-6).abs() < 1e-18);
            assert!((p.capacitance - 30.0e-9).abs() < 1e-21);
            assert!((p.tilt_angle - std::f64::consts::FRAC_PI_4).abs() < 1e-15);
            assert!((p.area - 100.0e-6).abs() < 1e-18);
            assert_eq!(p.input_voltage, 12.0);
        }
    }

    #[test]
    fn parameters_survive_a_reload() {
        let (t, v) = trapezoid();
        let mut set = RegionSet::new();
        set.set_capacitance(60.0);
        set.load_waveform(&t, &v).unwrap();
        assert!(set.regions().iter().all(|r| (r.params().capacitance - 60e-9).abs() < 1e-21));
    }

    #[test]
    fn single_region_mean_is_exact() {
        // Only the rising edge: one region.
        let time: Vec<f64> = (0..60).map(|i| i as f64).collect();
        let voltage: Vec<f64> = (0..60).map(|i| ((i as f64) - 10.0).clamp(0.0, 10.0)).collect();
        let mut set = RegionSet::new();
        set.load_waveform(&time, &voltage).unwrap();
        assert_eq!(set.len(), 1);

        let r = &set.regions()[0];
        assert_eq!(set.mean_polarization(), Ok(r.polarization()));
        assert_eq!(set.mean_viscosity(), Ok(r.viscosity()));
        assert_eq!(set.mean_anisotropy(), Ok(r.anisotropy()));
    }

    #[test]
    fn empty_set_means_fail() {
        let set = RegionSet::new();
        assert_eq!(set.mean_polarization(), Err(QueryError::NoRegions));
        assert_eq!(set.mean_viscosity(), Err(QueryError::NoRegions));
        assert_eq!(set.mean_anisotropy(), Err(QueryError::NoRegions));
        assert!(set.means().is_err());
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let mut set = loaded_trapezoid();
        assert_eq!(set.load_waveform(&[], &[]), Ok(LoadOutcome::Skipped));
        assert!(set.is_loaded());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn segmentation_failure_keeps_previous_regions() {
        let mut set = loaded_trapezoid();
        let t: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let flat = vec![0.0; 10];
        assert_eq!(
            set.load_waveform(&t, &flat),
            Err(LoadError::Segment(SegmentError::NoTransitions))
        );
        assert!(set.is_loaded());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn region_failure_leaves_set_cleared() {
        let mut set = loaded_trapezoid();
        // Step in the last samples: nothing is left between the guard bands for alpha.
        let t: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let mut v = vec![0.0; 12];
        v[10] = 5.0;
        v[11] = 5.0;
        let err = set.load_waveform(&t, &v).unwrap_err();
        assert!(matches!(err, LoadError::Region { index: 0, .. }), "{err:?}");
        assert!(!set.is_loaded());
        assert!(set.is_empty());
    }

    #[test]
    fn overshoot_without_t40_crossing_clears_the_set() {
        // Ringing peak before the knee: after it the voltage never climbs back
        // to the t40 level, then a hold and a large fall.
        let mut voltage = vec![0.0; 4];
        voltage.extend([10.0, 20.0, 15.0, 12.0, 11.5, 11.4, 11.3, 11.2, 11.1, 11.0, 11.0, 11.0]);
        voltage.extend([-20.0, -60.0, -60.0, -60.0, -60.0, -60.0]);
        let time: Vec<f64> = (0..voltage.len()).map(|i| i as f64).collect();

        let mut set = loaded_trapezoid();
        assert_eq!(
            set.load_waveform(&time, &voltage),
            Err(LoadError::Region {
                index: 0,
                source: RegionError::MarkerNotFound { marker: "t40" },
            })
        );
        assert!(!set.is_loaded());
        assert!(set.is_empty());
    }

    #[test]
    fn foreign_segmentation_is_rejected_before_clearing() {
        let (t, v) = trapezoid();
        let seg = segment(&t, &v).unwrap();
        let mut set = loaded_trapezoid();

        let err = set.load_segmentation(&t[..50], &v[..50], &seg).unwrap_err();
        assert_eq!(
            err,
            LoadError::SegmentationMismatch {
                samples: 50,
                segmented: 100
            }
        );
        assert_eq!(
            set.load_segmentation(&t, &v[..99], &seg),
            Err(LoadError::Segment(SegmentError::LengthMismatch { time: 100, voltage: 99 }))
        );
        assert!(set.is_loaded());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn apply_inputs_sets_all_parameters() {
        let mut set = loaded_trapezoid();
        let inputs = CellInputs {
            input_voltage: 5.0,
            thickness_um: 2.0,
            area_mm2: 25.0,
            capacitance_nf: 15.0,
            tilt_deg: 30.0,
        };
        set.apply_inputs(&inputs);

        let expected = CellParams::from_inputs(&inputs);
        assert_eq!(set.params(), &expected);
        assert!(set.regions().iter().all(|r| r.params() == &expected));
    }

    #[test]
    fn reload_is_deterministic() {
        let (t, v) = trapezoid();
        let mut a = RegionSet::new();
        let mut b = RegionSet::new();
        a.load_waveform(&t, &v).unwrap();
        b.load_waveform(&t, &v).unwrap();
        a.load_waveform(&t, &v).unwrap();
        assert_eq!(a.regions(), b.regions());
    }

    #[test]
    fn synthetic_square_wave_alternates_and_covers() {
        let spec = SynthSpec::default();
        let wave = generate(&spec).unwrap();
        let seg = segment(&wave.time, &wave.voltage).unwrap();
        let mut set = RegionSet::new();
        set.load_waveform(&wave.time, &wave.voltage).unwrap();

        assert_eq!(set.len(), 2 * spec.periods);
        for pair in set.regions().windows(2) {
            assert_ne!(pair[0].direction(), pair[1].direction());
            assert_eq!(pair[0].borders().1, pair[1].borders().0);
        }
        assert_eq!(seg.windows.last().map(|w| w.end), Some(wave.time.len()));
        let first = set.regions()[0].borders().0;
        assert_eq!(first, wave.time[seg.windows[0].start]);

        for r in set.regions() {
            assert!(r.u_p() >= 0.0 && r.u_c() >= 0.0);
            assert!(r.t60_point().time >= r.t40_point().time);
            assert!((r.u_p() - spec.u_p).abs() < 0.05 * spec.u_p, "u_p={}", r.u_p());
            assert!((r.u_c() - spec.u_c).abs() < 0.05 * spec.u_c, "u_c={}", r.u_c());
            assert!((r.tau() - spec.tau).abs() < 0.2 * spec.tau, "tau={}", r.tau());
            assert!(r.alpha().abs() < 0.5, "alpha={}", r.alpha());
        }
    }

    #[test]
    fn noisy_square_wave_still_segments() {
        let spec = SynthSpec {
            noise_std: 0.005,
            seed: 7,
            ..SynthSpec::default()
        };
        let wave = generate(&spec).unwrap();
        let mut set = RegionSet::new();
        match set.load_waveform(&wave.time, &wave.voltage) {
            Ok(LoadOutcome::Loaded { regions }) => assert_eq!(regions, 2 * spec.periods),
            // Noise can push a point-wise alpha estimate onto u = ±1; that must
            // surface as a region error, never as NaN.
            Err(LoadError::Region {
                source: RegionError::NonFiniteAlpha { .. },
                ..
            }) => {}
            other => panic!("unexpected load result: {other:?}"),
        }
    }
}

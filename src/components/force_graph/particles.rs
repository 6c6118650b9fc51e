//! Directional flow particles along highlighted links.

/// Positions of `count` evenly spaced particles along a link, as fractions
/// of its length in `[0, 1)`. `speed` is the fraction travelled per 60 Hz
/// frame, so particles always move source → target.
pub fn particle_offsets(count: u32, flow_time: f64, speed: f64) -> impl Iterator<Item = f64> {
	let travelled = flow_time * speed * 60.0;
	let count_f = f64::from(count.max(1));
	(0..count).map(move |i| (travelled + f64::from(i) / count_f).rem_euclid(1.0))
}

/// Point at fraction `t` of the segment `from` → `to`.
pub fn point_along(from: (f64, f64), to: (f64, f64), t: f64) -> (f64, f64) {
	(from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_offsets_are_evenly_spaced() {
		let offsets: Vec<f64> = particle_offsets(4, 0.0, 0.01).collect();
		assert_eq!(offsets, [0.0, 0.25, 0.5, 0.75]);
		assert_eq!(particle_offsets(0, 1.0, 0.01).count(), 0);
	}

	#[test]
	fn test_offsets_wrap_forward() {
		// 0.5 s at 0.01 per frame = 0.3 of the link.
		let offsets: Vec<f64> = particle_offsets(2, 0.5, 0.01).collect();
		assert!((offsets[0] - 0.3).abs() < 1e-9);
		assert!((offsets[1] - 0.8).abs() < 1e-9);

		let later: Vec<f64> = particle_offsets(2, 1.0, 0.01).collect();
		assert!((later[1] - 0.1).abs() < 1e-9);
	}

	#[test]
	fn test_point_along() {
		assert_eq!(point_along((0.0, 0.0), (10.0, -4.0), 0.5), (5.0, -2.0));
	}
}

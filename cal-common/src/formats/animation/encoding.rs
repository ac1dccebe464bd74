//! Rotation packing for skeletal keyframes.

// ============================================================================
// Quaternion Encoding: Smallest-Three
// ============================================================================

/// Pack a unit quaternion into 32 bits.
///
/// Drops the largest component and reconstructs it from the other three on
/// decode.
///
/// Bit layout: `[a:10][b:10][c:10][idx:2]`
/// - idx identifies which component was dropped (largest)
/// - a, b, c are the three remaining components quantized to 10 bits
///
/// Quantization maps `[-1/√2, 1/√2]` onto `[0, 1023]` via
/// `round((v * √2 + 1) * 511.5)`.
pub fn encode_quat_smallest_three(q: [f32; 4]) -> u32 {
    let abs_q = q.map(f32::abs);
    let idx = if abs_q[0] > abs_q[1] && abs_q[0] > abs_q[2] && abs_q[0] > abs_q[3] {
        0
    } else if abs_q[1] > abs_q[2] && abs_q[1] > abs_q[3] {
        1
    } else if abs_q[2] > abs_q[3] {
        2
    } else {
        3
    };

    // q and -q are the same rotation; keep the dropped component positive
    let sign = if q[idx] < 0.0 { -1.0 } else { 1.0 };
    let q = q.map(|c| c * sign);

    let (a, b, c) = match idx {
        0 => (q[1], q[2], q[3]),
        1 => (q[0], q[2], q[3]),
        2 => (q[0], q[1], q[3]),
        _ => (q[0], q[1], q[2]),
    };

    let quantize = |v: f32| {
        (((v * std::f32::consts::SQRT_2 + 1.0) * 511.5).round().max(0.0) as u32).min(1023)
    };

    (quantize(a) << 22) | (quantize(b) << 12) | (quantize(c) << 2) | (idx as u32)
}

/// Unpack a smallest-three quaternion into `[x, y, z, w]`.
pub fn decode_quat_smallest_three(packed: u32) -> [f32; 4] {
    let idx = (packed & 0x3) as usize;
    let dequantize =
        |bits: u32| ((bits & 0x3FF) as f32 / 511.5 - 1.0) * std::f32::consts::FRAC_1_SQRT_2;
    let a = dequantize(packed >> 22);
    let b = dequantize(packed >> 12);
    let c = dequantize(packed >> 2);

    let largest = (1.0 - a * a - b * b - c * c).max(0.0).sqrt();

    match idx {
        0 => [largest, a, b, c],
        1 => [a, largest, b, c],
        2 => [a, b, largest, c],
        _ => [a, b, c, largest],
    }
}

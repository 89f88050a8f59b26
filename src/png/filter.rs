//! Scanline filters (PNG filter method 0).
//!
//! Each predictor looks at `a` (the byte `bpp` to the left), `b` (the byte
//! above) and `c` (above-left); bytes outside the image count as zero.

/// Per-scanline filter type byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum FilterType {
    None = 0,
    Sub = 1,
    Up = 2,
    Average = 3,
    Paeth = 4,
}

impl FilterType {
    pub const ALL: [FilterType; 5] = [
        FilterType::None,
        FilterType::Sub,
        FilterType::Up,
        FilterType::Average,
        FilterType::Paeth,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::None,
            1 => Self::Sub,
            2 => Self::Up,
            3 => Self::Average,
            4 => Self::Paeth,
            _ => return None,
        })
    }
}

pub(crate) fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let p = i16::from(a) + i16::from(b) - i16::from(c);
    let pa = (p - i16::from(a)).abs();
    let pb = (p - i16::from(b)).abs();
    let pc = (p - i16::from(c)).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

#[inline]
fn neighbours(row: &[u8], prev: Option<&[u8]>, i: usize, bpp: usize) -> (u8, u8, u8) {
    let a = if i >= bpp { row[i - bpp] } else { 0 };
    let (b, c) = match prev {
        Some(prev) => (prev[i], if i >= bpp { prev[i - bpp] } else { 0 }),
        None => (0, 0),
    };
    (a, b, c)
}

#[inline]
fn predict(filter: FilterType, a: u8, b: u8, c: u8) -> u8 {
    match filter {
        FilterType::None => 0,
        FilterType::Sub => a,
        FilterType::Up => b,
        FilterType::Average => ((u16::from(a) + u16::from(b)) / 2) as u8,
        FilterType::Paeth => paeth_predictor(a, b, c),
    }
}

/// Reverse `filter` in place. `prev` is the already reconstructed row above,
/// `None` for the first row.
pub(crate) fn unfilter_row(filter: FilterType, row: &mut [u8], prev: Option<&[u8]>, bpp: usize) {
    match filter {
        FilterType::None => {}
        FilterType::Sub => {
            for i in bpp..row.len() {
                row[i] = row[i].wrapping_add(row[i - bpp]);
            }
        }
        FilterType::Up => {
            if let Some(prev) = prev {
                for (cur, up) in row.iter_mut().zip(prev) {
                    *cur = cur.wrapping_add(*up);
                }
            }
        }
        FilterType::Average | FilterType::Paeth => {
            // `a` must come from the reconstructed row, so go left to right.
            for i in 0..row.len() {
                let (a, b, c) = neighbours(row, prev, i, bpp);
                row[i] = row[i].wrapping_add(predict(filter, a, b, c));
            }
        }
    }
}

/// Apply `filter` to the raw `row`, appending the residuals to `out`.
pub(crate) fn filter_row(
    filter: FilterType,
    row: &[u8],
    prev: Option<&[u8]>,
    bpp: usize,
    out: &mut Vec<u8>,
) {
    out.extend(row.iter().enumerate().map(|(i, &x)| {
        let (a, b, c) = neighbours(row, prev, i, bpp);
        x.wrapping_sub(predict(filter, a, b, c))
    }));
}

/// Pick the filter with the smallest sum of absolute signed residuals and
/// append the filter byte plus residuals to `out`.
pub(crate) fn filter_row_adaptive(
    row: &[u8],
    prev: Option<&[u8]>,
    bpp: usize,
    scratch: &mut Vec<u8>,
    out: &mut Vec<u8>,
) {
    let mut best: Option<(u64, FilterType)> = None;
    for filter in FilterType::ALL {
        scratch.clear();
        filter_row(filter, row, prev, bpp, scratch);
        let cost: u64 = scratch
            .iter()
            .map(|&r| u64::from((r as i8).unsigned_abs()))
            .sum();
        if best.is_none_or(|(best_cost, _)| cost < best_cost) {
            best = Some((cost, filter));
        }
    }
    let filter = best.map_or(FilterType::None, |(_, f)| f);
    out.push(filter as u8);
    filter_row(filter, row, prev, bpp, out);
}

//! Circle packing for the bubble chart
//!
//! Siblings are placed with the front-chain algorithm (Wang et al.) and
//! the enclosing circle comes from a randomized Welzl-style search. The
//! random source is a fixed-seed LCG so the same weights always produce
//! the same layout.

use std::cmp::Ordering;

use crate::models::{Metric, TokenRecord};

/// One laid-out bubble. `index` points back into the input slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackedCircle {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Circle {
    x: f64,
    y: f64,
    r: f64,
}

struct Lcg(u64);

impl Lcg {
    const A: u64 = 1_664_525;
    const C: u64 = 1_013_904_223;
    const M: u64 = 4_294_967_296;

    fn new() -> Self {
        Lcg(1)
    }

    fn next(&mut self) -> f64 {
        self.0 = (Self::A * self.0 + Self::C) % Self::M;
        self.0 as f64 / Self::M as f64
    }
}

/// Pack records as circles whose area follows `metric`, scaled to fit a
/// `width` x `height` canvas with `padding` pixels between neighbours.
/// Output is ordered largest first.
pub fn pack_records(
    records: &[TokenRecord],
    metric: Metric,
    width: f64,
    height: f64,
    padding: f64,
) -> Vec<PackedCircle> {
    let weights: Vec<f64> = records.iter().map(|r| metric.value(r)).collect();
    pack(&weights, width, height, padding)
}

/// Pack raw weights. Negative or non-finite weights count as zero.
pub fn pack(weights: &[f64], width: f64, height: f64, padding: f64) -> Vec<PackedCircle> {
    if weights.is_empty() {
        return Vec::new();
    }

    let weights: Vec<f64> = weights
        .iter()
        .map(|&w| if w.is_finite() && w > 0.0 { w } else { 0.0 })
        .collect();

    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| weights[b].partial_cmp(&weights[a]).unwrap_or(Ordering::Equal));

    let mut circles: Vec<Circle> = order
        .iter()
        .map(|&i| Circle { x: 0.0, y: 0.0, r: weights[i].sqrt() })
        .collect();

    // Nothing to size by; fall back to equal bubbles.
    if circles.iter().all(|c| c.r == 0.0) {
        for c in &mut circles {
            c.r = 1.0;
        }
    }

    let side = width.min(height);
    let mut random = Lcg::new();

    let unpadded = pack_siblings(&mut circles, &mut random);

    let pad = if side > 0.0 { padding.max(0.0) * unpadded / side } else { 0.0 };
    for c in &mut circles {
        c.r += pad;
    }
    let enclosing = pack_siblings(&mut circles, &mut random);
    for c in &mut circles {
        c.r -= pad;
    }

    let root_r = enclosing + pad;
    let k = if root_r > 0.0 && side > 0.0 { side / (2.0 * root_r) } else { 0.0 };

    circles
        .iter()
        .zip(&order)
        .map(|(c, &index)| PackedCircle {
            index,
            x: width / 2.0 + k * c.x,
            y: height / 2.0 + k * c.y,
            r: c.r * k,
        })
        .collect()
}

/// Place `c` tangent to both `a` and `b`
fn place(b: Circle, a: Circle, c: &mut Circle) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let d2 = dx * dx + dy * dy;

    if d2 > 0.0 {
        let a2 = (a.r + c.r).powi(2);
        let b2 = (b.r + c.r).powi(2);
        if a2 > b2 {
            let x = (d2 + b2 - a2) / (2.0 * d2);
            let y = (b2 / d2 - x * x).max(0.0).sqrt();
            c.x = b.x - x * dx - y * dy;
            c.y = b.y - x * dy + y * dx;
        } else {
            let x = (d2 + a2 - b2) / (2.0 * d2);
            let y = (a2 / d2 - x * x).max(0.0).sqrt();
            c.x = a.x + x * dx - y * dy;
            c.y = a.y + x * dy + y * dx;
        }
    } else {
        c.x = a.x + c.r;
        c.y = a.y;
    }
}

fn intersects(a: Circle, b: Circle) -> bool {
    let dr = a.r + b.r - 1e-6;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

/// Squared distance from the origin to the weighted midpoint of a chain link
fn score(circles: &[Circle], next: &[usize], node: usize) -> f64 {
    let a = circles[node];
    let b = circles[next[node]];
    let ab = a.r + b.r;
    let dx = (a.x * b.r + b.x * a.r) / ab;
    let dy = (a.y * b.r + b.y * a.r) / ab;
    dx * dx + dy * dy
}

/// Lay out `circles` around the origin without overlap and return the
/// radius of their enclosing circle. The front chain is a circular doubly
/// linked list stored as `next`/`prev` index vectors.
fn pack_siblings(circles: &mut [Circle], random: &mut Lcg) -> f64 {
    let n = circles.len();
    if n == 0 {
        return 0.0;
    }

    circles[0].x = 0.0;
    circles[0].y = 0.0;
    if n == 1 {
        return circles[0].r;
    }

    circles[0].x = -circles[1].r;
    circles[1].x = circles[0].r;
    circles[1].y = 0.0;
    if n == 2 {
        return circles[0].r + circles[1].r;
    }

    let (c0, c1) = (circles[0], circles[1]);
    place(c1, c0, &mut circles[2]);

    let mut next = vec![0usize; n];
    let mut prev = vec![0usize; n];
    next[0] = 1;
    prev[2] = 1;
    next[1] = 2;
    prev[0] = 2;
    next[2] = 0;
    prev[1] = 0;

    let (mut a, mut b) = (0usize, 1usize);
    let mut i = 3;

    'pack: while i < n {
        let (ca, cb) = (circles[a], circles[b]);
        place(ca, cb, &mut circles[i]);
        let ci = circles[i];

        // Find the closest circle on the front chain that the new one hits.
        let (mut j, mut k) = (next[b], prev[a]);
        let (mut sj, mut sk) = (circles[b].r, circles[a].r);
        loop {
            if sj <= sk {
                if intersects(circles[j], ci) {
                    b = j;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sj += circles[j].r;
                j = next[j];
            } else {
                if intersects(circles[k], ci) {
                    a = k;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sk += circles[k].r;
                k = prev[k];
            }
            if j == next[k] {
                break;
            }
        }

        prev[i] = a;
        next[i] = b;
        next[a] = i;
        prev[b] = i;
        b = i;

        let mut best = score(circles, &next, a);
        let mut c = next[b];
        while c != b {
            let s = score(circles, &next, c);
            if s < best {
                a = c;
                best = s;
            }
            c = next[c];
        }
        b = next[a];
        i += 1;
    }

    let mut chain = vec![circles[b]];
    let mut c = next[b];
    while c != b {
        chain.push(circles[c]);
        c = next[c];
    }
    let e = enclose(&chain, random);

    for circle in circles.iter_mut() {
        circle.x -= e.x;
        circle.y -= e.y;
    }
    e.r
}

fn shuffle(circles: &mut [Circle], random: &mut Lcg) {
    let mut m = circles.len();
    while m > 0 {
        let i = (random.next() * m as f64) as usize;
        m -= 1;
        circles.swap(m, i);
    }
}

/// Smallest circle enclosing all of `circles`
fn enclose(circles: &[Circle], random: &mut Lcg) -> Circle {
    let mut shuffled = circles.to_vec();
    shuffle(&mut shuffled, random);

    let mut basis: Vec<Circle> = Vec::new();
    let mut e: Option<Circle> = None;
    let mut i = 0;

    while i < shuffled.len() {
        let p = shuffled[i];
        match e {
            Some(current) if encloses_weak(current, p) => i += 1,
            _ => match extend_basis(&basis, p) {
                Some(extended) => {
                    basis = extended;
                    e = Some(enclose_basis(&basis));
                    i = 0;
                }
                None => return bounding_circle(circles),
            },
        }
    }

    e.unwrap_or_default()
}

fn extend_basis(basis: &[Circle], p: Circle) -> Option<Vec<Circle>> {
    if encloses_weak_all(p, basis) {
        return Some(vec![p]);
    }

    for &bi in basis {
        if encloses_not(p, bi) && encloses_weak_all(enclose_basis2(bi, p), basis) {
            return Some(vec![bi, p]);
        }
    }

    for i in 0..basis.len().saturating_sub(1) {
        for j in (i + 1)..basis.len() {
            let (bi, bj) = (basis[i], basis[j]);
            if encloses_not(enclose_basis2(bi, bj), p)
                && encloses_not(enclose_basis2(bi, p), bj)
                && encloses_not(enclose_basis2(bj, p), bi)
                && encloses_weak_all(enclose_basis3(bi, bj, p), basis)
            {
                return Some(vec![bi, bj, p]);
            }
        }
    }

    None
}

fn encloses_not(a: Circle, b: Circle) -> bool {
    let dr = a.r - b.r;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr < 0.0 || dr * dr < dx * dx + dy * dy
}

fn encloses_weak(a: Circle, b: Circle) -> bool {
    let dr = a.r - b.r + a.r.max(b.r).max(1.0) * 1e-9;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

fn encloses_weak_all(a: Circle, basis: &[Circle]) -> bool {
    basis.iter().all(|&b| encloses_weak(a, b))
}

fn enclose_basis(basis: &[Circle]) -> Circle {
    match basis {
        [a] => *a,
        [a, b] => enclose_basis2(*a, *b),
        [a, b, c] => enclose_basis3(*a, *b, *c),
        _ => bounding_circle(basis),
    }
}

fn enclose_basis2(a: Circle, b: Circle) -> Circle {
    let x21 = b.x - a.x;
    let y21 = b.y - a.y;
    let r21 = b.r - a.r;
    let l = (x21 * x21 + y21 * y21).sqrt();
    Circle {
        x: (a.x + b.x + x21 / l * r21) / 2.0,
        y: (a.y + b.y + y21 / l * r21) / 2.0,
        r: (l + a.r + b.r) / 2.0,
    }
}

fn enclose_basis3(a: Circle, b: Circle, c: Circle) -> Circle {
    let (x1, y1, r1) = (a.x, a.y, a.r);
    let (x2, y2, r2) = (b.x, b.y, b.r);
    let (x3, y3, r3) = (c.x, c.y, c.r);

    let a2 = x1 - x2;
    let a3 = x1 - x3;
    let b2 = y1 - y2;
    let b3 = y1 - y3;
    let c2 = r2 - r1;
    let c3 = r3 - r1;
    let d1 = x1 * x1 + y1 * y1 - r1 * r1;
    let d2 = d1 - x2 * x2 - y2 * y2 + r2 * r2;
    let d3 = d1 - x3 * x3 - y3 * y3 + r3 * r3;
    let ab = a3 * b2 - a2 * b3;
    let xa = (b2 * d3 - b3 * d2) / (ab * 2.0) - x1;
    let xb = (b3 * c2 - b2 * c3) / ab;
    let ya = (a3 * d2 - a2 * d3) / (ab * 2.0) - y1;
    let yb = (a2 * c3 - a3 * c2) / ab;
    let qa = xb * xb + yb * yb - 1.0;
    let qb = 2.0 * (r1 + xa * xb + ya * yb);
    let qc = xa * xa + ya * ya - r1 * r1;
    let r = -(if qa.abs() > 1e-6 {
        (qb + (qb * qb - 4.0 * qa * qc).sqrt()) / (2.0 * qa)
    } else {
        qc / qb
    });

    Circle {
        x: x1 + xa + xb * r,
        y: y1 + ya + yb * r,
        r,
    }
}

/// Loose enclosure around the centroid, used if the exact search gives up
fn bounding_circle(circles: &[Circle]) -> Circle {
    if circles.is_empty() {
        return Circle::default();
    }
    let n = circles.len() as f64;
    let x = circles.iter().map(|c| c.x).sum::<f64>() / n;
    let y = circles.iter().map(|c| c.y).sum::<f64>() / n;
    let r = circles
        .iter()
        .map(|c| ((c.x - x).powi(2) + (c.y - y).powi(2)).sqrt() + c.r)
        .fold(0.0, f64::max);
    Circle { x, y, r }
}

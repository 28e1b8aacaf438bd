//! Tolerant reader for CSS `transform` values.
//!
//! Animation libraries write the element's inline transform every frame
//! (`translate3d(..) rotate(45deg) scale(1.5, 1.5)`), and computed style
//! reports `matrix(a, b, c, d, e, f)`. Only rotation about the view axis and
//! 2-D scale are mirrored. Each component is optional: anything missing or
//! malformed reads as `None` and the caller falls back to identity.

use std::f32::consts::PI;

/// Rotation and scale extracted from one transform string.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CssTransform {
    /// Clockwise rotation in degrees, as CSS reports it.
    pub rotate_deg: Option<f32>,
    pub scale: Option<(f32, f32)>,
    /// Number of components that looked like rotate/scale/matrix but failed
    /// to parse.
    pub malformed: u32,
}

impl CssTransform {
    /// Mesh rotation about +z in radians. CSS rotates clockwise with y down;
    /// the scene has y up, hence the sign flip.
    #[inline]
    pub fn rotation_z(&self) -> f32 {
        -self.rotate_deg.unwrap_or(0.0) * PI / 180.0
    }

    #[inline]
    pub fn scale_or_identity(&self) -> (f32, f32) {
        self.scale.unwrap_or((1.0, 1.0))
    }
}

pub fn parse_transform(value: &str) -> CssTransform {
    let mut out = CssTransform::default();
    let value = value.trim();
    if value.is_empty() || value == "none" {
        return out;
    }

    for (name, args) in functions(value) {
        match name.to_ascii_lowercase().as_str() {
            "rotate" | "rotatez" => match args.first().and_then(|a| parse_angle_deg(a)) {
                Some(deg) if args.len() == 1 => out.rotate_deg = Some(deg),
                _ => out.malformed += 1,
            },
            "scale" => match parse_scale_args(&args) {
                Some(s) => out.scale = Some(s),
                None => out.malformed += 1,
            },
            "matrix" => match parse_matrix(&args) {
                Some((deg, s)) => {
                    out.rotate_deg = Some(deg);
                    out.scale = Some(s);
                }
                None => out.malformed += 1,
            },
            _ => {}
        }
    }
    out
}

/// Split `a(1) b(2, 3)` into `[("a", ["1"]), ("b", ["2", "3"])]`.
/// Nested groups such as `calc(..)` or `var(..)` stay inside their argument.
/// Unbalanced trailing input is dropped.
fn functions(value: &str) -> Vec<(&str, Vec<&str>)> {
    let mut out = Vec::new();
    let mut rest = value;
    while let Some(open) = rest.find('(') {
        let name = rest[..open].trim();
        let after = &rest[open + 1..];
        let Some(close) = matching_close(after) else {
            break;
        };
        let args = split_top_level(&after[..close])
            .into_iter()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect();
        if !name.is_empty() {
            out.push((name, args));
        }
        rest = &after[close + 1..];
    }
    out
}

/// Byte index of the `)` closing a group whose `(` precedes `s`.
fn matching_close(s: &str) -> Option<usize> {
    let mut depth = 0u32;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Split on commas that are not inside a nested group.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0u32;
    let mut start = 0;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn parse_angle_deg(arg: &str) -> Option<f32> {
    let arg = arg.trim();
    // longest suffixes first: "grad" and "rad" share a tail
    let (num, factor) = if let Some(n) = arg.strip_suffix("deg") {
        (n, 1.0)
    } else if let Some(n) = arg.strip_suffix("grad") {
        (n, 0.9)
    } else if let Some(n) = arg.strip_suffix("rad") {
        (n, 180.0 / PI)
    } else if let Some(n) = arg.strip_suffix("turn") {
        (n, 360.0)
    } else if arg.parse::<f32>().ok() == Some(0.0) {
        (arg, 1.0)
    } else {
        return None;
    };
    let v: f32 = num.trim().parse().ok()?;
    v.is_finite().then_some(v * factor)
}

fn parse_number(arg: &str) -> Option<f32> {
    let v: f32 = arg.trim().parse().ok()?;
    v.is_finite().then_some(v)
}

fn parse_scale_args(args: &[&str]) -> Option<(f32, f32)> {
    match args {
        [s] => {
            let s = parse_number(s)?;
            Some((s, s))
        }
        [x, y] => Some((parse_number(x)?, parse_number(y)?)),
        _ => None,
    }
}

fn parse_matrix(args: &[&str]) -> Option<(f32, (f32, f32))> {
    if args.len() != 6 {
        return None;
    }
    let mut m = [0.0f32; 6];
    for (slot, a) in m.iter_mut().zip(args) {
        *slot = parse_number(a)?;
    }
    let [a, b, c, d, _, _] = m;
    let sx = (a * a + b * b).sqrt();
    let det = a * d - b * c;
    let sy = if sx > f32::EPSILON { det / sx } else { (c * c + d * d).sqrt() };
    let deg = b.atan2(a) * 180.0 / PI;
    Some((deg, (sx, sy)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rotate_and_single_scale() {
        let t = parse_transform("rotate(45deg) scale(1.5)");
        assert_eq!(t.rotate_deg, Some(45.0));
        assert_eq!(t.scale, Some((1.5, 1.5)));
        assert_eq!(t.malformed, 0);
    }

    #[test]
    fn reads_animation_library_output() {
        let t = parse_transform("translate(-500px, 0px) rotate(360deg) scale(0.3, 0.3)");
        assert_eq!(t.rotate_deg, Some(360.0));
        assert_eq!(t.scale, Some((0.3, 0.3)));
    }

    #[test]
    fn angle_units() {
        assert_eq!(parse_transform("rotate(0.5turn)").rotate_deg, Some(180.0));
        assert_eq!(parse_transform("rotate(100grad)").rotate_deg, Some(90.0));
        let r = parse_transform("rotate(3.14159265rad)").rotate_deg.unwrap();
        assert!((r - 180.0).abs() < 1e-3);
        assert_eq!(parse_transform("rotate(0)").rotate_deg, Some(0.0));
    }

    #[test]
    fn malformed_components_are_none() {
        let t = parse_transform("rotate(abc) scale()");
        assert_eq!(t.rotate_deg, None);
        assert_eq!(t.scale, None);
        assert_eq!(t.malformed, 2);
        assert_eq!(t.rotation_z(), 0.0);
        assert_eq!(t.scale_or_identity(), (1.0, 1.0));
    }

    #[test]
    fn unbalanced_input_is_ignored() {
        let t = parse_transform("scale(2) rotate(10deg");
        assert_eq!(t.scale, Some((2.0, 2.0)));
        assert_eq!(t.rotate_deg, None);
    }

    #[test]
    fn nested_groups_do_not_hide_later_components() {
        let t = parse_transform("translate(calc(10px + 5px), 0px) rotate(45deg) scale(1.5)");
        assert_eq!(t.rotate_deg, Some(45.0));
        assert_eq!(t.scale, Some((1.5, 1.5)));
        assert_eq!(t.malformed, 0);

        let t = parse_transform("translate(var(--x), 0) rotate(30deg)");
        assert_eq!(t.rotate_deg, Some(30.0));
        assert_eq!(t.malformed, 0);
    }

    #[test]
    fn nested_group_inside_rotate_counts_as_malformed() {
        let t = parse_transform("rotate(calc(10deg + 5deg)) scale(2, 3)");
        assert_eq!(t.rotate_deg, None);
        assert_eq!(t.scale, Some((2.0, 3.0)));
        assert_eq!(t.malformed, 1);
    }

    #[test]
    fn matrix_decomposes_rotation_and_scale() {
        // rotate(90deg) scale(2)
        let t = parse_transform("matrix(0, 2, -2, 0, 0, 0)");
        assert!((t.rotate_deg.unwrap() - 90.0).abs() < 1e-4);
        let (sx, sy) = t.scale.unwrap();
        assert!((sx - 2.0).abs() < 1e-5 && (sy - 2.0).abs() < 1e-5);
    }
}

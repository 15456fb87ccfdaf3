//! Shape measurement questions answered from a formula table.
//!
//! Requests name a shape and a quantity (area, perimeter, volume, and
//! so on) with dimensions pulled out of the question text. Solving is
//! always three beats: state the formula, substitute, compute. Answers
//! that involve pi keep an exact form next to the decimal.

use std::f64::consts::PI;

use regex::Regex;

use crate::error::{Error, Result};
use crate::explain::Tracer;
use crate::parse::format_number;
use crate::problem::{Category, Solution};

use super::engine::{approx_text, round_to, CategorySolver};
use super::intent::Task;
use super::polynomial::fraction_text;

/// A fully parameterized shape question.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryRequest {
    CircleArea { radius: f64 },
    CircleCircumference { radius: f64 },
    RectangleArea { width: f64, height: f64 },
    RectanglePerimeter { width: f64, height: f64 },
    SquareArea { side: f64 },
    SquarePerimeter { side: f64 },
    TriangleArea { base: f64, height: f64 },
    TrianglePerimeter { a: f64, b: f64, c: f64 },
    Hypotenuse { a: f64, b: f64 },
    MissingLeg { hypotenuse: f64, leg: f64 },
    SphereVolume { radius: f64 },
    SphereSurfaceArea { radius: f64 },
    CylinderVolume { radius: f64, height: f64 },
    ConeVolume { radius: f64, height: f64 },
}

const NUMBER: &str = r"(\-?\d+(?:\.\d+)?)";

/// Pull a shape question out of normalized text.
///
/// Dimensions are read from `name value`, `name = value`, and `name of
/// value` phrasings, plus `3 by 4` pairs for rectangles.
///
/// # Errors
///
/// Returns [`Error::UnsupportedProblem`] with a usage hint when the
/// shape, quantity, or a required dimension is missing, and
/// [`Error::MathDomain`] for non-positive lengths.
pub fn parse_request(text: &str) -> Result<GeometryRequest> {
    if text.contains("hypotenuse") || text.contains("pythagor") {
        return parse_right_triangle(text);
    }

    let quantity = if text.contains("circumference") {
        Quantity::Circumference
    } else if text.contains("perimeter") {
        Quantity::Perimeter
    } else if text.contains("surface") {
        Quantity::SurfaceArea
    } else if text.contains("volume") {
        Quantity::Volume
    } else if text.contains("area") {
        Quantity::Area
    } else {
        return Err(Error::unsupported(
            "say which measurement you need, e.g. 'area of a circle with radius 5'",
        ));
    };

    let shape = ["circle", "rectangle", "square", "triangle", "sphere", "cylinder", "cone"]
        .into_iter()
        .find(|s| text.contains(s));
    let shape = match shape {
        Some(s) => s,
        // "circumference of radius 5" can only mean a circle
        None if quantity == Quantity::Circumference => "circle",
        None => {
            return Err(Error::unsupported(
                "name the shape, e.g. 'area of a circle with radius 5'",
            ))
        }
    };

    match (shape, quantity) {
        ("circle", Quantity::Area) => Ok(GeometryRequest::CircleArea {
            radius: circle_radius(text)?,
        }),
        ("circle", Quantity::Circumference | Quantity::Perimeter) => {
            Ok(GeometryRequest::CircleCircumference {
                radius: circle_radius(text)?,
            })
        }
        ("rectangle", Quantity::Area) => {
            let (width, height) = two_dims(text, "rectangle")?;
            Ok(GeometryRequest::RectangleArea { width, height })
        }
        ("rectangle", Quantity::Perimeter) => {
            let (width, height) = two_dims(text, "rectangle")?;
            Ok(GeometryRequest::RectanglePerimeter { width, height })
        }
        ("square", Quantity::Area) => Ok(GeometryRequest::SquareArea {
            side: side_length(text)?,
        }),
        ("square", Quantity::Perimeter) => Ok(GeometryRequest::SquarePerimeter {
            side: side_length(text)?,
        }),
        ("triangle", Quantity::Area) => {
            let base = named_value(text, "base").ok_or_else(|| {
                Error::unsupported(
                    "give the base and height, e.g. 'area of a triangle with base 6 and height 4'",
                )
            })?;
            let height = named_value(text, "height").ok_or_else(|| {
                Error::unsupported(
                    "give the base and height, e.g. 'area of a triangle with base 6 and height 4'",
                )
            })?;
            Ok(GeometryRequest::TriangleArea {
                base: positive(base, "base")?,
                height: positive(height, "height")?,
            })
        }
        ("triangle", Quantity::Perimeter) => {
            let (a, b, c) = triple_after(text, "sides?").ok_or_else(|| {
                Error::unsupported(
                    "give all three sides, e.g. 'perimeter of a triangle with sides 3, 4 and 5'",
                )
            })?;
            Ok(GeometryRequest::TrianglePerimeter {
                a: positive(a, "side")?,
                b: positive(b, "side")?,
                c: positive(c, "side")?,
            })
        }
        ("sphere", Quantity::Volume) => Ok(GeometryRequest::SphereVolume {
            radius: circle_radius(text)?,
        }),
        ("sphere", Quantity::SurfaceArea | Quantity::Area) => {
            Ok(GeometryRequest::SphereSurfaceArea {
                radius: circle_radius(text)?,
            })
        }
        ("cylinder", Quantity::Volume) => {
            let (radius, height) = radius_and_height(text, "cylinder")?;
            Ok(GeometryRequest::CylinderVolume { radius, height })
        }
        ("cone", Quantity::Volume) => {
            let (radius, height) = radius_and_height(text, "cone")?;
            Ok(GeometryRequest::ConeVolume { radius, height })
        }
        (shape, quantity) => Err(Error::unsupported(format!(
            "the {} of a {shape} is not supported",
            quantity.name()
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Quantity {
    Area,
    Perimeter,
    Circumference,
    SurfaceArea,
    Volume,
}

impl Quantity {
    fn name(self) -> &'static str {
        match self {
            Self::Area => "area",
            Self::Perimeter => "perimeter",
            Self::Circumference => "circumference",
            Self::SurfaceArea => "surface area",
            Self::Volume => "volume",
        }
    }
}

fn parse_right_triangle(text: &str) -> Result<GeometryRequest> {
    if let Some((a, b)) = pair_after(text, "legs").or_else(|| pair_after(text, "sides?")) {
        return Ok(GeometryRequest::Hypotenuse {
            a: positive(a, "leg")?,
            b: positive(b, "leg")?,
        });
    }
    if let (Some(hypotenuse), Some(leg)) =
        (named_value(text, "hypotenuse"), named_value(text, "leg"))
    {
        let hypotenuse = positive(hypotenuse, "hypotenuse")?;
        let leg = positive(leg, "leg")?;
        if leg >= hypotenuse {
            return Err(Error::math_domain(
                "the leg must be shorter than the hypotenuse",
            ));
        }
        return Ok(GeometryRequest::MissingLeg { hypotenuse, leg });
    }
    // "pythagorean theorem a=3 b=4" names the legs individually
    if let (Some(a), Some(b)) = (named_value(text, "a"), named_value(text, "b")) {
        return Ok(GeometryRequest::Hypotenuse {
            a: positive(a, "leg")?,
            b: positive(b, "leg")?,
        });
    }
    Err(Error::unsupported(
        "give both legs, e.g. 'hypotenuse of a right triangle with legs 3 and 4'",
    ))
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern)
        .unwrap_or_else(|err| panic!("invalid built-in pattern {pattern:?}: {err}"))
}

/// Find `name <value>` with an optional `=`, `:`, `of`, or `is` between.
fn named_value(text: &str, name: &str) -> Option<f64> {
    let re = compile(&format!(r"\b{name}\s*(?:=|:|of|is)?\s*{NUMBER}"));
    re.captures(text).and_then(|c| c[1].parse().ok())
}

/// Find `name <value> and <value>` pairs, as in "legs 3 and 4".
fn pair_after(text: &str, name: &str) -> Option<(f64, f64)> {
    let re = compile(&format!(
        r"\b{name}\s*(?:=|:|of|is)?\s*{NUMBER}\s*(?:and|,|&)\s*{NUMBER}"
    ));
    let caps = re.captures(text)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// Find `name <v>, <v> and <v>` triples, as in "sides 3, 4 and 5".
fn triple_after(text: &str, name: &str) -> Option<(f64, f64, f64)> {
    let re = compile(&format!(
        r"\b{name}\s*(?:=|:|of|is)?\s*{NUMBER}\s*(?:,|and)\s*{NUMBER}\s*(?:,\s*and|,|and)\s*{NUMBER}"
    ));
    let caps = re.captures(text)?;
    Some((
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    ))
}

/// Find a bare `3 by 4` dimension pair.
fn dimension_pair(text: &str) -> Option<(f64, f64)> {
    let re = compile(&format!(r"{NUMBER}\s*(?:by|x)\s*{NUMBER}"));
    let caps = re.captures(text)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

fn circle_radius(text: &str) -> Result<f64> {
    // "r" covers the shorthand "circle r=5"
    if let Some(radius) = named_value(text, "radius").or_else(|| named_value(text, "r")) {
        return positive(radius, "radius");
    }
    if let Some(diameter) = named_value(text, "diameter") {
        return Ok(positive(diameter, "diameter")? / 2.0);
    }
    Err(Error::unsupported(
        "give the radius, e.g. 'area of a circle with radius 5'",
    ))
}

fn side_length(text: &str) -> Result<f64> {
    let side = named_value(text, "sides?").ok_or_else(|| {
        Error::unsupported("give the side length, e.g. 'area of a square with side 6'")
    })?;
    positive(side, "side")
}

fn two_dims(text: &str, shape: &str) -> Result<(f64, f64)> {
    let dims = match (named_value(text, "width"), named_value(text, "height")) {
        (Some(w), Some(h)) => Some((w, h)),
        _ => match (named_value(text, "length"), named_value(text, "width")) {
            (Some(l), Some(w)) => Some((l, w)),
            _ => dimension_pair(text),
        },
    };
    let (a, b) = dims.ok_or_else(|| {
        Error::unsupported(format!(
            "give both dimensions, e.g. 'area of a {shape} 3 by 4'"
        ))
    })?;
    Ok((positive(a, "length")?, positive(b, "length")?))
}

fn radius_and_height(text: &str, shape: &str) -> Result<(f64, f64)> {
    let radius = named_value(text, "radius").ok_or_else(|| {
        Error::unsupported(format!(
            "give the radius and height, e.g. 'volume of a {shape} with radius 3 and height 4'"
        ))
    })?;
    let height = named_value(text, "height").ok_or_else(|| {
        Error::unsupported(format!(
            "give the radius and height, e.g. 'volume of a {shape} with radius 3 and height 4'"
        ))
    })?;
    Ok((positive(radius, "radius")?, positive(height, "height")?))
}

fn positive(value: f64, what: &str) -> Result<f64> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(Error::math_domain(format!("the {what} must be positive")))
    }
}

/// Solver that works requests through formula, substitution, and value.
#[derive(Debug)]
pub struct GeometrySolver {
    decimals: u8,
}

impl GeometrySolver {
    #[must_use]
    pub fn new(decimals: u8) -> Self {
        Self { decimals }
    }

    #[allow(clippy::too_many_lines)]
    fn solve_request(&self, request: &GeometryRequest) -> Result<Solution> {
        let mut tracer = Tracer::new();
        let answer = match request {
            GeometryRequest::CircleArea { radius } => {
                let r = format_number(*radius);
                tracer.show("State the formula for the area of a circle", "a = pi * r^2");
                let substituted = format!("a = pi * {r}^2");
                tracer.rewrite(format!("Substitute r = {r}"), "a = pi * r^2", substituted.clone());
                self.pi_result(&mut tracer, "a", radius * radius, 1.0, &substituted)
            }
            GeometryRequest::CircleCircumference { radius } => {
                let r = format_number(*radius);
                tracer.show(
                    "State the formula for the circumference of a circle",
                    "c = 2 * pi * r",
                );
                let substituted = format!("c = 2 * pi * {r}");
                tracer.rewrite(format!("Substitute r = {r}"), "c = 2 * pi * r", substituted.clone());
                self.pi_result(&mut tracer, "c", 2.0 * radius, 1.0, &substituted)
            }
            GeometryRequest::RectangleArea { width, height } => {
                let (w, h) = (format_number(*width), format_number(*height));
                tracer.show("State the formula for the area of a rectangle", "a = w * h");
                let substituted = format!("a = {w} * {h}");
                tracer.rewrite("Substitute the side lengths", "a = w * h", substituted.clone());
                self.plain_result(&mut tracer, "a", width * height, &substituted)
            }
            GeometryRequest::RectanglePerimeter { width, height } => {
                let (w, h) = (format_number(*width), format_number(*height));
                tracer.show(
                    "State the formula for the perimeter of a rectangle",
                    "p = 2 * (w + h)",
                );
                let substituted = format!("p = 2 * ({w} + {h})");
                tracer.rewrite("Substitute the side lengths", "p = 2 * (w + h)", substituted.clone());
                self.plain_result(&mut tracer, "p", 2.0 * (width + height), &substituted)
            }
            GeometryRequest::SquareArea { side } => {
                let s = format_number(*side);
                tracer.show("State the formula for the area of a square", "a = s^2");
                let substituted = format!("a = {s}^2");
                tracer.rewrite(format!("Substitute s = {s}"), "a = s^2", substituted.clone());
                self.plain_result(&mut tracer, "a", side * side, &substituted)
            }
            GeometryRequest::SquarePerimeter { side } => {
                let s = format_number(*side);
                tracer.show("State the formula for the perimeter of a square", "p = 4s");
                let substituted = format!("p = 4 * {s}");
                tracer.rewrite(format!("Substitute s = {s}"), "p = 4s", substituted.clone());
                self.plain_result(&mut tracer, "p", 4.0 * side, &substituted)
            }
            GeometryRequest::TriangleArea { base, height } => {
                let (b, h) = (format_number(*base), format_number(*height));
                tracer.show(
                    "State the formula for the area of a triangle",
                    "a = (b * h)/2",
                );
                let substituted = format!("a = ({b} * {h})/2");
                tracer.rewrite(
                    format!("Substitute b = {b} and h = {h}"),
                    "a = (b * h)/2",
                    substituted.clone(),
                );
                self.plain_result(&mut tracer, "a", base * height / 2.0, &substituted)
            }
            GeometryRequest::TrianglePerimeter { a, b, c } => {
                let (ta, tb, tc) = (format_number(*a), format_number(*b), format_number(*c));
                tracer.show(
                    "State the formula for the perimeter of a triangle",
                    "p = a + b + c",
                );
                let substituted = format!("p = {ta} + {tb} + {tc}");
                tracer.rewrite("Substitute the sides", "p = a + b + c", substituted.clone());
                self.plain_result(&mut tracer, "p", a + b + c, &substituted)
            }
            GeometryRequest::Hypotenuse { a, b } => self.hypotenuse(&mut tracer, *a, *b),
            GeometryRequest::MissingLeg { hypotenuse, leg } => {
                self.missing_leg(&mut tracer, *hypotenuse, *leg)
            }
            GeometryRequest::SphereVolume { radius } => {
                let r = format_number(*radius);
                tracer.show(
                    "State the formula for the volume of a sphere",
                    "v = (4/3) * pi * r^3",
                );
                let substituted = format!("v = (4/3) * pi * {r}^3");
                tracer.rewrite(
                    format!("Substitute r = {r}"),
                    "v = (4/3) * pi * r^3",
                    substituted.clone(),
                );
                self.pi_result(&mut tracer, "v", 4.0 * radius.powi(3), 3.0, &substituted)
            }
            GeometryRequest::SphereSurfaceArea { radius } => {
                let r = format_number(*radius);
                tracer.show(
                    "State the formula for the surface area of a sphere",
                    "a = 4 * pi * r^2",
                );
                let substituted = format!("a = 4 * pi * {r}^2");
                tracer.rewrite(
                    format!("Substitute r = {r}"),
                    "a = 4 * pi * r^2",
                    substituted.clone(),
                );
                self.pi_result(&mut tracer, "a", 4.0 * radius * radius, 1.0, &substituted)
            }
            GeometryRequest::CylinderVolume { radius, height } => {
                let (r, h) = (format_number(*radius), format_number(*height));
                tracer.show(
                    "State the formula for the volume of a cylinder",
                    "v = pi * r^2 * h",
                );
                let substituted = format!("v = pi * {r}^2 * {h}");
                tracer.rewrite(
                    format!("Substitute r = {r} and h = {h}"),
                    "v = pi * r^2 * h",
                    substituted.clone(),
                );
                self.pi_result(&mut tracer, "v", radius * radius * height, 1.0, &substituted)
            }
            GeometryRequest::ConeVolume { radius, height } => {
                let (r, h) = (format_number(*radius), format_number(*height));
                tracer.show(
                    "State the formula for the volume of a cone",
                    "v = (1/3) * pi * r^2 * h",
                );
                let substituted = format!("v = (1/3) * pi * {r}^2 * {h}");
                tracer.rewrite(
                    format!("Substitute r = {r} and h = {h}"),
                    "v = (1/3) * pi * r^2 * h",
                    substituted.clone(),
                );
                self.pi_result(&mut tracer, "v", radius * radius * height, 3.0, &substituted)
            }
        };
        Ok(tracer.finish(answer, Category::Geometry))
    }

    fn hypotenuse(&self, tracer: &mut Tracer, a: f64, b: f64) -> String {
        let (ta, tb) = (format_number(a), format_number(b));
        tracer.show("State the Pythagorean theorem", "c^2 = a^2 + b^2");
        let substituted = format!("c^2 = {ta}^2 + {tb}^2");
        tracer.rewrite(
            format!("Substitute a = {ta} and b = {tb}"),
            "c^2 = a^2 + b^2",
            substituted.clone(),
        );
        let square = a * a + b * b;
        let summed = format!("c^2 = {}", format_number(square));
        tracer.rewrite("Add the squares", substituted, summed.clone());
        let c = square.sqrt();
        let shown = format_number(round_to(c, self.decimals));
        let answer = approx_text(c, self.decimals);
        let after = if answer.starts_with('≈') {
            format!("c ≈ {shown}")
        } else {
            format!("c = {shown}")
        };
        tracer.rewrite("Take the square root", summed, after);
        answer
    }

    fn missing_leg(&self, tracer: &mut Tracer, hypotenuse: f64, leg: f64) -> String {
        let (tc, ta) = (format_number(hypotenuse), format_number(leg));
        tracer.show("State the Pythagorean theorem", "a^2 + b^2 = c^2");
        tracer.rewrite(
            "Solve for the missing leg",
            "a^2 + b^2 = c^2",
            "b^2 = c^2 - a^2",
        );
        let substituted = format!("b^2 = {tc}^2 - {ta}^2");
        tracer.rewrite(
            format!("Substitute c = {tc} and a = {ta}"),
            "b^2 = c^2 - a^2",
            substituted.clone(),
        );
        let square = hypotenuse * hypotenuse - leg * leg;
        let diffed = format!("b^2 = {}", format_number(square));
        tracer.rewrite("Subtract the squares", substituted, diffed.clone());
        let b = square.sqrt();
        let shown = format_number(round_to(b, self.decimals));
        let answer = approx_text(b, self.decimals);
        let after = if answer.starts_with('≈') {
            format!("b ≈ {shown}")
        } else {
            format!("b = {shown}")
        };
        tracer.rewrite("Take the square root", diffed, after);
        answer
    }

    /// Push the compute step for a `coefficient * pi` value, keeping the
    /// exact form when the coefficient is rational.
    fn pi_result(
        &self,
        tracer: &mut Tracer,
        symbol: &str,
        numerator: f64,
        denominator: f64,
        substituted: &str,
    ) -> String {
        let value = numerator / denominator * PI;
        let rounded = format_number(round_to(value, self.decimals));
        if numerator.fract() == 0.0 {
            let frac = fraction_text(numerator, denominator);
            let exact = if frac.contains('/') {
                format!("({frac})pi")
            } else {
                format!("{frac}pi")
            };
            tracer.rewrite(
                "Compute the value",
                substituted.to_string(),
                format!("{symbol} = {exact}"),
            );
            format!("{exact} ≈ {rounded}")
        } else {
            tracer.rewrite(
                "Compute the value",
                substituted.to_string(),
                format!("{symbol} ≈ {rounded}"),
            );
            format!("≈ {rounded}")
        }
    }

    fn plain_result(
        &self,
        tracer: &mut Tracer,
        symbol: &str,
        value: f64,
        substituted: &str,
    ) -> String {
        let shown = format_number(round_to(value, self.decimals));
        let answer = approx_text(value, self.decimals);
        let after = if answer.starts_with('≈') {
            format!("{symbol} ≈ {shown}")
        } else {
            format!("{symbol} = {shown}")
        };
        tracer.rewrite("Compute the value", substituted.to_string(), after);
        answer
    }
}

impl CategorySolver for GeometrySolver {
    fn name(&self) -> &'static str {
        "geometry"
    }

    fn category(&self) -> Category {
        Category::Geometry
    }

    fn solve(&self, task: &Task) -> Result<Solution> {
        match task {
            Task::Geometry(request) => self.solve_request(request),
            other => Err(Error::internal(format!(
                "geometry solver received {other:?}"
            ))),
        }
    }
}

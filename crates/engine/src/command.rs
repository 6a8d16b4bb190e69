//! GeoGebra command rendering.

use std::fmt;

/// A single construction step in GeoGebra's command language.
///
/// The rendered strings are the wire format between the backend and the
/// applet: arguments are substituted in place and never reordered.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `A = (x, y)`
    Point { name: String, x: f64, y: f64 },
    /// `l = Line(A, B)`
    Line {
        name: String,
        point1: String,
        point2: String,
    },
    /// `c = Circle(M, r)`
    Circle {
        name: String,
        center: String,
        radius: f64,
    },
    /// `f(x) = expr`, or restricted to `[min, max]` when a domain is given.
    Function {
        name: String,
        expression: String,
        domain: Option<(f64, f64)>,
    },
    /// `poly = Polygon(A, B, C)`
    Polygon { name: String, vertices: Vec<String> },
    /// `i = Integral(f, a, b)`
    Integral {
        name: String,
        function: String,
        lower: f64,
        upper: f64,
    },
    /// Wipe every object from the construction.
    Clear,
    /// A raw command passed through untouched.
    Raw(String),
}

impl Command {
    /// Render the command string sent to the engine.
    pub fn render(&self) -> String {
        match self {
            Self::Point { name, x, y } => format!("{name} = ({x}, {y})"),
            Self::Line {
                name,
                point1,
                point2,
            } => format!("{name} = Line({point1}, {point2})"),
            Self::Circle {
                name,
                center,
                radius,
            } => format!("{name} = Circle({center}, {radius})"),
            Self::Function {
                name,
                expression,
                domain: Some((min, max)),
            } => format!("{name}(x) = If({min} <= x <= {max}, {expression}, ?)"),
            Self::Function {
                name,
                expression,
                domain: None,
            } => format!("{name}(x) = {expression}"),
            Self::Polygon { name, vertices } => {
                format!("{name} = Polygon({})", vertices.join(", "))
            }
            Self::Integral {
                name,
                function,
                lower,
                upper,
            } => format!("{name} = Integral({function}, {lower}, {upper})"),
            Self::Clear => "Delete(*)".to_string(),
            Self::Raw(command) => command.clone(),
        }
    }

    /// Name of the object this command creates, if it creates exactly one.
    pub fn object_name(&self) -> Option<&str> {
        match self {
            Self::Point { name, .. }
            | Self::Line { name, .. }
            | Self::Circle { name, .. }
            | Self::Function { name, .. }
            | Self::Polygon { name, .. }
            | Self::Integral { name, .. } => Some(name.as_str()),
            Self::Clear | Self::Raw(_) => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

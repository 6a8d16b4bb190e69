//! Built-in tutoring agents.
//!
//! An agent is a persona: a system prompt plus whether it may drive the
//! graphing tools. Every agent runs through the same tool loop.

use crate::{Error, Result};
use serde::Serialize;

pub const DEFAULT_AGENT: &str = "geogebra";

/// A tutoring persona.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    #[serde(skip)]
    pub system_prompt: &'static str,
    /// Whether the GeoGebra catalog is offered to the model.
    pub uses_tools: bool,
    pub enabled: bool,
}

const GEOGEBRA_PROMPT: &str = "\
You are a mathematics teaching assistant who builds visualizations with GeoGebra.

Available tools:
1. geogebra_plot_function - plot a function graph
2. geogebra_plot_integral - shade the area between a function and the x-axis
3. geogebra_create_point - create a point
4. geogebra_create_line - create a line through two points
5. geogebra_create_circle - create a circle
6. geogebra_create_polygon - create a polygon
7. geogebra_clear_construction - clear the drawing
8. geogebra_eval_command - run a raw GeoGebra command

Rules:
1. You may call several tools in one reply.
2. When the user asks for an integral, an area under a curve or a shaded region, first call \
geogebra_plot_function to define the function, then geogebra_plot_integral to shade it.
3. Use only geogebra_plot_function when just a graph is requested.
4. Explain the mathematics clearly and briefly.

Example: for \"show the integral of x^2 from 0 to 2\" call
- geogebra_plot_function(name=\"f\", expression=\"x^2\")
- geogebra_plot_integral(name=\"i1\", functionName=\"f\", lowerBound=0, upperBound=2)";

const MATH_TUTOR_PROMPT: &str = "\
You are an all-round mathematics tutor. You explain concepts, solve problems step by step, \
write practice exercises with answers, and draw with GeoGebra whenever a picture helps.

Drawing rules:
1. You may call several GeoGebra tools in one reply.
2. For integrals or areas, define the function with geogebra_plot_function first, then shade \
it with geogebra_plot_integral.
3. Name objects simply (f, g, A, B, i1) so later steps can refer to them.

Keep explanations accurate and suited to the student's level.";

const STEP_SOLVER_PROMPT: &str = "\
You break mathematical problems into clear, numbered steps. For each step state what is done \
and why, show the intermediate result, and finish with the final answer. Cover algebra, \
calculus and linear algebra. Point out common mistakes where they are likely.";

const CONCEPT_EXPLAINER_PROMPT: &str = "\
You explain mathematical concepts and theorems in plain language. Start from intuition, use \
analogies and small worked examples, then give the precise definition. Check understanding \
with a short question at the end.";

const EXERCISE_GENERATOR_PROMPT: &str = "\
You write graded practice exercises for a given topic: multiple choice, fill in the blank and \
open questions, ordered from easy to hard. Give each exercise an answer and a worked \
explanation, clearly separated from the questions.";

static BUILTIN: [Agent; 5] = [
    Agent {
        id: "geogebra",
        name: "GeoGebra Visualizer",
        description: "Geometry, function graphs and integral visualizations drawn with GeoGebra.",
        icon: "📊",
        system_prompt: GEOGEBRA_PROMPT,
        uses_tools: true,
        enabled: true,
    },
    Agent {
        id: "math-tutor",
        name: "Math Tutor",
        description: "Exercises, graphs, geometry and integrals: one assistant for every lesson.",
        icon: "🎓",
        system_prompt: MATH_TUTOR_PROMPT,
        uses_tools: true,
        enabled: true,
    },
    Agent {
        id: "step-solver",
        name: "Step Solver",
        description: "Splits algebra, calculus and linear algebra problems into detailed steps.",
        icon: "🧮",
        system_prompt: STEP_SOLVER_PROMPT,
        uses_tools: false,
        enabled: true,
    },
    Agent {
        id: "concept-explainer",
        name: "Concept Explainer",
        description: "Explains concepts and theorems in plain language with analogies and examples.",
        icon: "📖",
        system_prompt: CONCEPT_EXPLAINER_PROMPT,
        uses_tools: false,
        enabled: true,
    },
    Agent {
        id: "exercise-generator",
        name: "Exercise Generator",
        description: "Graded exercises for a topic, with answers and worked solutions.",
        icon: "📝",
        system_prompt: EXERCISE_GENERATOR_PROMPT,
        uses_tools: false,
        enabled: true,
    },
];

/// Lookup table of the agents a request may select.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: &'static [Agent],
    default_id: &'static str,
}

impl AgentRegistry {
    /// The built-in agents with `geogebra` as default.
    pub fn builtin() -> Self {
        Self {
            agents: &BUILTIN,
            default_id: DEFAULT_AGENT,
        }
    }

    /// The built-in agents with another default.
    pub fn with_default(id: &str) -> Result<Self> {
        let registry = Self::builtin();
        let agent = registry.find(id)?;
        Ok(Self {
            default_id: agent.id,
            ..registry
        })
    }

    pub fn default_agent(&self) -> &'static Agent {
        // default_id always names a built-in agent
        self.agents
            .iter()
            .find(|agent| agent.id == self.default_id)
            .unwrap_or(&self.agents[0])
    }

    /// Resolve the agent a request asked for; `None` or a blank id selects
    /// the default.
    pub fn resolve(&self, id: Option<&str>) -> Result<&'static Agent> {
        match id.map(str::trim).filter(|id| !id.is_empty()) {
            None => Ok(self.default_agent()),
            Some(id) => self.find(id),
        }
    }

    fn find(&self, id: &str) -> Result<&'static Agent> {
        self.agents
            .iter()
            .find(|agent| agent.id == id && agent.enabled)
            .ok_or_else(|| Error::UnknownAgent(id.to_string()))
    }

    /// Enabled agents, in display order.
    pub fn list(&self) -> impl Iterator<Item = &'static Agent> + '_ {
        self.agents.iter().filter(|agent| agent.enabled)
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

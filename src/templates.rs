use crate::models::Interview;

/// Interview loop typically run for each kind of role.
pub const ROLE_TEMPLATES: &[(&str, &[&str])] = &[
    ("software_engineer", &["Technical", "System Design", "Behavioral"]),
    ("product_manager", &["Product Sense", "Behavioral", "Case Study"]),
    ("designer", &["Portfolio Review", "Design Exercise", "Behavioral"]),
    ("data_scientist", &["Technical", "Statistics", "Behavioral"]),
    ("sales", &["Sales Pitch", "Role Play", "Behavioral"]),
    ("electrical_engineer", &["Technical", "Design Review", "Behavioral"]),
    ("mechanical_engineer", &["Technical", "Design Review", "Behavioral"]),
    ("civil_engineer", &["Technical", "Project Review", "Behavioral"]),
    ("chemical_engineer", &["Technical", "Process Review", "Behavioral"]),
    ("aerospace_engineer", &["Technical", "Design Review", "Behavioral"]),
    ("biomedical_engineer", &["Technical", "Design Review", "Behavioral"]),
    ("industrial_engineer", &["Technical", "Process Review", "Behavioral"]),
    ("environmental_engineer", &["Technical", "Project Review", "Behavioral"]),
];

pub fn role_template(role: &str) -> Option<&'static [&'static str]> {
    ROLE_TEMPLATES
        .iter()
        .find(|(key, _)| *key == role)
        .map(|(_, kinds)| *kinds)
}

/// One blank interview per stage of the role's loop.
pub fn interviews_for_role(role: &str) -> Option<Vec<Interview>> {
    let kinds = role_template(role)?;
    Some(
        kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| Interview {
                id: format!("interview-{}", i),
                kind: kind.to_string(),
                ..Interview::default()
            })
            .collect(),
    )
}

/// The template whose loop matches these interviews exactly, in order.
pub fn matching_role(interviews: &[Interview]) -> Option<&'static str> {
    ROLE_TEMPLATES
        .iter()
        .find(|(_, kinds)| {
            kinds.len() == interviews.len()
                && kinds.iter().zip(interviews).all(|(k, i)| *k == i.kind)
        })
        .map(|(key, _)| *key)
}

pub struct Prep {
    pub kind: &'static str,
    pub checklist: &'static [&'static str],
    pub links: &'static [&'static str],
}

pub fn prep_for(kind: &str) -> Option<&'static Prep> {
    INTERVIEW_PREP
        .iter()
        .find(|p| p.kind.eq_ignore_ascii_case(kind.trim()))
}

pub const INTERVIEW_PREP: &[Prep] = &[
    Prep {
        kind: "Technical",
        checklist: &[
            "Identify weak patterns (graphs, DP, trees) and drill them first",
            "Practice aloud: restate, constraints, brute force, optimize, test",
            "Use pattern playbook: two-pointers, sliding window, prefix/suffix, union-find, heap, sweep line",
            "Track time/space and tradeoffs for each solution",
            "Write unit-style tests for edge cases (empty, single, dupes, extremes)",
            "Review language-specific pitfalls (overflow, mutability, references)",
            "Refresh core CS: complexity table, sorting, hashing, recursion vs iteration",
            "Do timed mocks and analyze misses (speed vs. accuracy vs. comms)",
            "Prepare 2-3 concise project deep dives with metrics and impact",
            "Verify dev setup for live coding (editor, runtime, tests)",
        ],
        links: &[
            "https://www.techinterviewhandbook.org/",
            "https://leetcode.com/",
            "https://neetcode.io/roadmap",
            "https://www.hackerrank.com/",
            "https://github.com/jwasham/coding-interview-university",
            "https://interviewing.io/",
        ],
    },
    Prep {
        kind: "Design Review",
        checklist: &[
            "Prepare 2-3 detailed engineering projects with design process, constraints, and outcomes",
            "Review engineering fundamentals: statics, dynamics, materials, thermodynamics",
            "Practice explaining technical concepts to non-technical stakeholders",
            "Prepare for design trade-off discussions (cost vs performance vs reliability)",
            "Review relevant codes, standards, and regulations (ASME, IEEE, OSHA, etc.)",
            "Bring portfolio with CAD drawings, schematics, or technical diagrams",
            "Practice failure analysis: root cause identification and prevention strategies",
            "Prepare examples of design optimization and iterative improvement",
            "Review project management experience: timeline, budget, team coordination",
            "Understand company's products, manufacturing processes, and engineering challenges",
        ],
        links: &[
            "https://www.asme.org/career-education/early-career-engineers",
            "https://www.ieee.org/membership/students/index.html",
            "https://www.engineeringtoolbox.com/",
            "https://www.autodesk.com/education/home",
        ],
    },
    Prep {
        kind: "Process Review",
        checklist: &[
            "Map out end-to-end processes you've designed, optimized, or managed",
            "Quantify improvements: efficiency gains, cost reduction, quality metrics",
            "Review process control fundamentals: PID controllers, feedback loops",
            "Prepare lean manufacturing and Six Sigma examples if applicable",
            "Review safety protocols: HAZOP, risk assessment, safety instrumentation",
            "Practice explaining process flow diagrams and P&IDs",
            "Prepare examples of troubleshooting and process optimization",
            "Review regulatory compliance: FDA, EPA, OSHA requirements",
            "Understand supply chain and logistics impact on processes",
            "Prepare for scale-up discussions: pilot to production challenges",
        ],
        links: &[
            "https://www.aiche.org/resources/career/career-resources",
            "https://www.isixsigma.com/",
            "https://www.lean.org/",
            "https://www.nist.gov/manufacturing-extension-partnership",
        ],
    },
    Prep {
        kind: "Project Review",
        checklist: &[
            "Prepare 2-3 major projects: scope, timeline, budget, deliverables, outcomes",
            "Review project management methodologies: waterfall, agile, critical path",
            "Practice stakeholder management examples: clients, contractors, regulators",
            "Quantify project success: on-time delivery, budget adherence, performance metrics",
            "Review risk management: identification, mitigation, contingency planning",
            "Prepare examples of problem-solving during project execution",
            "Review relevant engineering standards and building codes",
            "Practice presenting technical information to diverse audiences",
            "Prepare examples of cross-functional team leadership",
            "Review environmental impact and sustainability considerations",
        ],
        links: &[
            "https://www.pmi.org/",
            "https://www.asce.org/career-and-growth/",
            "https://www.nspe.org/resources/career-center",
            "https://www.constructionexec.com/",
        ],
    },
    Prep {
        kind: "System Design",
        checklist: &[
            "Open with requirements: goals, non-goals, scale (QPS, storage, latency), SLA",
            "Propose high-level diagram: client, API, services, DBs, cache, queue, storage",
            "Choose data models (SQL vs NoSQL) and justify with access patterns",
            "Plan scaling: sharding/partitioning, replication, read/write paths",
            "Add reliability: retries, idempotency, circuit breakers, backpressure",
            "Latency plan: caching layers, indexes, CQRS, pagination, precompute",
            "State tradeoffs (CAP, consistency models, exactly-once vs at-least-once)",
            "Observability: metrics, logs, tracing, SLOs, alerts, dashboards",
            "Bottlenecks and growth: where it breaks first and how you'd evolve it",
            "Security & privacy basics: authn/z, secrets, PII handling, rate limits",
        ],
        links: &[
            "https://github.com/donnemartin/system-design-primer",
            "https://hellointerview.com/learn/system-design/in-a-hurry/introduction",
            "https://www.pragmaticengineer.com/preparing-for-the-systems-design-and-coding-interviews/",
            "https://martin.kleppmann.com/ddia.html",
        ],
    },
    Prep {
        kind: "Behavioral",
        checklist: &[
            "Map 6-8 STAR stories to common themes (impact, conflict, failure, leadership, ownership, ambiguity)",
            "Attach numbers to results (revenue, latency, costs, adoption, uptime)",
            "Show learning loops: mistake -> action -> changed behavior",
            "Mirror company values with authentic examples, not buzzwords",
            "Prep 5 sharp questions for the team, product, and roadmap",
            "Practice concise delivery (2-3 minutes per story) and active listening",
            "Have a clear motivation narrative for the role and company",
            "Plan compensation and location constraints talking points",
        ],
        links: &[
            "https://www.techinterviewhandbook.org/behavioral-interview/",
            "https://www.themuse.com/advice/star-interview-method",
        ],
    },
    Prep {
        kind: "Product Sense",
        checklist: &[
            "Frame with a product method (e.g., CIRCLES): users, needs, goals, constraints",
            "Define target user and JTBD; map top pains and current alternatives",
            "Propose solutions with tradeoffs; prioritize by impact x effort",
            "Define success metrics (activation, retention, NPS, revenue) and guardrails",
            "Think go-to-market, risks, and ethical considerations",
            "Run one concrete example: user flow + edge cases",
            "Add v1, v2 roadmap and experiment ideas (A/Bs, surveys, usability tests)",
        ],
        links: &[
            "https://www.tryexponent.com/product-management",
            "https://www.reforge.com/blog/product-sense",
            "https://www.amazon.com/Decode-Conquer-Answers-Product-Management/dp/0998120448",
        ],
    },
    Prep {
        kind: "Case Study",
        checklist: &[
            "Clarify scope, objective, constraints, and timeline before solving",
            "Choose a fitting structure (profitability, growth, market entry) then adapt",
            "State assumptions with ranges; sanity-check with quick math",
            "Build a simple model; pressure-test sensitivity and risks",
            "Synthesize findings and clear recommendation with next steps",
            "Prepare slides that tell a story: problem -> options -> decision -> impact",
        ],
        links: &[
            "https://www.caseinterview.com/",
            "https://www.strategycase.com/",
            "https://www.firmsconsulting.com/",
        ],
    },
    Prep {
        kind: "Portfolio Review",
        checklist: &[
            "Curate 3-5 strongest projects; each with problem, constraints, process, outcome",
            "Show iterations: early mocks -> usability findings -> final designs",
            "Explain tradeoffs and rejected alternatives",
            "Quantify impact (conversion, time-on-task, error rate, revenue)",
            "Prepare interactive prototypes and make links load fast",
            "Rehearse 10-12 minute walkthrough and a 2-minute TL;DR",
            "Add a 'what I'd improve next' slide for each project",
        ],
        links: &[
            "https://www.nngroup.com/articles/ux-portfolio/",
            "https://www.coursera.org/specializations/ux-design",
            "https://dribbble.com/",
        ],
    },
    Prep {
        kind: "Statistics",
        checklist: &[
            "Recall core stats: distributions, CLT, CI, p-values, effect size, power",
            "Know A/B testing end-to-end: randomization, sample size, metrics, pitfalls",
            "Explain ML basics plainly: bias-variance, regularization, cross-validation",
            "SQL fluency: joins, GROUP BY, window functions, subqueries, CTEs",
            "Practice experiment debugging (peeking, novelty, seasonality, SRM)",
            "Prepare 2-3 analytics stories with business outcomes",
        ],
        links: &[
            "https://www.stat.cmu.edu/~cshalizi/ADAfaEPoV/",
            "https://www.statquest.org/",
            "https://www.mode.com/sql-tutorial",
            "https://sqlbolt.com/",
            "https://www.statlearning.com/",
        ],
    },
    Prep {
        kind: "Sales Pitch",
        checklist: &[
            "Research prospect: industry metrics, current stack, likely pains",
            "Discovery first: 5-7 probing questions to quantify pain and urgency",
            "Tailor demo to 2-3 critical pains; show outcomes, not features",
            "Handle top objections with proof (case studies, ROI math, social proof)",
            "Discuss pricing with value framing; anchor and present options",
            "Define clear next step: pilot scope, timeline, success criteria",
        ],
        links: &[
            "https://www.hubspot.com/sales/sales-process",
            "https://www.gong.io/blog/",
            "https://meddicc.com/what-is-meddicc/",
        ],
    },
    Prep {
        kind: "Role Play",
        checklist: &[
            "Stay in role; keep the conversation natural and goal-oriented",
            "Use active listening and summarize back to confirm understanding",
            "Ask layered questions (open -> specific -> confirm)",
            "Negotiate with interests, not positions; trade, don't concede",
            "Manage time: discovery, solution, objections, close",
            "Close with a crisp recap and agreed next action",
        ],
        links: &[
            "https://www.blackboxthinking.com/never-split-the-difference-chris-voss",
            "https://www.cruciallearning.com/books/crucial-conversations/",
            "https://hbr.org/2016/06/the-elements-of-good-judgment",
        ],
    },
];

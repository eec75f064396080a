//! Criterion definitions, deduplicated and mapped back to the source metrics.

use super::Criterion;

pub static ULPR_CRITERIA: [Criterion; 17] = [
    // A. Outcomes & Alignment (25)
    Criterion {
        code: "A1",
        name: "SMARTIE Outcomes & Success Criteria",
        weight: 8.0,
        description: "Outcomes use measurable verbs with success criteria; clearly stated aims; student-friendly; \
                      includes inclusivity/equity within outcomes when relevant.",
        band_notes: [
            "Missing/unclear outcomes or criteria.",
            "Vague aims; outcomes mostly non-measurable (e.g., 'understand').",
            "About half the outcomes are measurable; criteria inconsistent.",
            "Most outcomes are SMARTIE; clear criteria; minor gaps only.",
            "All outcomes are SMARTIE with explicit criteria; clearly linked to aims; inclusive language visible.",
        ],
        sources: &["M8.1 Aims & SMARTIE", "M1.1 Learning Intentions", "M6.7 Success Criteria"],
    },
    Criterion {
        code: "A2",
        name: "Alignment: TLAs ↔ Outcomes ↔ Assessment",
        weight: 9.0,
        description: "Every key ILO has at least one learning activity and one assessment task at the same cognitive level; \
                      activities and assessment mirror the intended performances.",
        band_notes: [
            "No visible alignment; activities/tests don't match outcomes.",
            "Partial links; several orphaned activities or mismatched levels.",
            "Mostly aligned but with gaps in coverage or level.",
            "Strong match on both content and level across the plan.",
            "Transparent mapping; assessments authentically evidence the performances; students see 'what good looks like'.",
        ],
        sources: &["M3.2 TLAs", "M3.3 Assessment authenticity", "M5.6 Alignment", "M8.2 Structure"],
    },
    Criterion {
        code: "A3",
        name: "Structure, Timing & Flow",
        weight: 8.0,
        description: "Coherent sequence (activate prior knowledge → model → guided → independent), realistic timings with buffers; \
                      small steps are visible; worked examples precede independence where appropriate.",
        band_notes: [
            "Arbitrary order; unrealistic timing; big undifferentiated 'teach' blocks.",
            "Some sequencing but still rushed/optimistic; limited step design.",
            "Mostly coherent; minor issues; steps are present but uneven.",
            "Clear simple→complex flow with time boxes; steps each have explain→example→short practice.",
            "Exemplary pacing and transitions with contingency buffers; consistent stepwise design.",
        ],
        sources: &["M8.2 Structure", "M6.2 Small steps", "M6.4 Worked examples"],
    },
    // B. Engagement & Interaction (20)
    Criterion {
        code: "B1",
        name: "ICAP Engagement Mix",
        weight: 6.0,
        description: "Share of time in Constructive/Interactive modes vs Passive/Active; aim for ≥50% C+I with some I.",
        band_notes: [
            "≥80% Passive; little/no Active/Constructive/Interactive.",
            "Mostly Passive/Active; <20% Constructive/Interactive.",
            "30–49% Constructive+Interactive; Interactive brief.",
            "50–69% C+I with ≥10% Interactive.",
            "≥70% C+I with ≥30% Interactive and credible plans to realize it.",
        ],
        sources: &["M2.D1 ICAP mix", "M5.1 Active time"],
    },
    Criterion {
        code: "B2",
        name: "Generative Tasks & Prompts",
        weight: 6.0,
        description: "Prompts/tasks require explain/justify/compare/predict; rubrics expect new ideas/links, not copies.",
        band_notes: [
            "Recall/copy prompts only.",
            "Occasional higher-order prompts; optional or vague.",
            "Some targeted generative prompts in key episodes.",
            "Frequent, well-framed generative prompts across episodes.",
            "Systematic progression (infer→justify→predict) tightly aligned to outcomes; outputs require novelty/justification.",
        ],
        sources: &["M2.D2 Prompts", "M2.D3 Output", "M5.2 Task quality"],
    },
    Criterion {
        code: "B3",
        name: "Whole-class Participation & Interactivity",
        weight: 8.0,
        description: "All-student response routines (polls, slates, cold-call with support) + structured group work with roles and joint products.",
        band_notes: [
            "Few respond; volunteers only; 'discuss' with no structure.",
            "Some mechanisms (think-pair-share) but many can stay passive; ad-hoc pairs.",
            "Multiple all-student response moments; groups have prompts but weak interdependence.",
            "Every activity requires all to produce/share; clear roles + shared products; teacher monitoring cues.",
            "Full protocol: roles, timed turns, criteria, rotation, public share-outs or peer-instruction cycles.",
        ],
        sources: &["M1.3 Questioning", "M2.D4 Interactivity", "M5.3 Participation", "M5.4 Group structure"],
    },
    // C. Retrieval & Assessment for Learning (20)
    Criterion {
        code: "C1",
        name: "Retrieval Density & Effort",
        weight: 6.0,
        description: "Distinct retrieval episodes (≥2–3) with high-effort formats (free recall, short-answer, no-notes problems).",
        band_notes: [
            "No retrieval opportunities.",
            "Brief recognition-only checks.",
            "One substantial retrieval or mix with low effort.",
            "Two retrievals with ≥50% high-effort.",
            "≥3 retrievals with ≥70% high-effort.",
        ],
        sources: &["M4.1 Density", "M4.2 Effort"],
    },
    Criterion {
        code: "C2",
        name: "Formative Checks & Actionable Feedback",
        weight: 7.0,
        description: "Aligned exit tickets/mini-quizzes/oral checks with immediate use (reteach/regroup/next task) and task-focused feedback time.",
        band_notes: [
            "No checks; feedback absent or grades only.",
            "One informal check; no action/time to use feedback.",
            "Some checks but misaligned or results not used.",
            "At least one aligned check with stated follow-up; clear feedback plan.",
            "≥2 aligned checks + explicit regroup/reteach plan; scheduled time to apply feedback now.",
        ],
        sources: &["M1.4 Feedback", "M1.6 Formative checks", "M6.6 CFU", "M5.5 Feedback loops"],
    },
    Criterion {
        code: "C3",
        name: "Spacing, Delayed Checks & Cumulative Coverage",
        weight: 7.0,
        description: "In-lesson spacing between retrievals; planned delayed cumulative checks (≈2 days & 1 week); later quizzes include prior content.",
        band_notes: [
            "No spacing; no delayed checks; no cumulative items.",
            "One immediate end check only; minimal revisit of prior content.",
            "Some spacing or one delayed check; limited cumulative items.",
            "Two spaced retrievals or ≥1 delayed ≥48h; 25–49% prior content later.",
            "≥3 spaced retrievals and both 2‑day & 1‑week checks; ≥50% cumulative items later.",
        ],
        sources: &["M4.4 Spacing", "M4.5 Delayed checks", "M4.6 Cumulative"],
    },
    // D. Instructional Design & Scaffolding (15)
    Criterion {
        code: "D1",
        name: "Models/Worked Examples & Guided Practice",
        weight: 6.0,
        description: "Full worked examples or think‑alouds precede independence; a timed, scaffolded 'we do' phase is present.",
        band_notes: [
            "None; straight to independent work.",
            "Examples or 'guided' mentioned but thin; no timing/prompts.",
            "Clear worked example and specific guided tasks with timing.",
            "As 3 + contrasting/common‑error example and teacher prompts during circulation.",
            "Exemplary sequencing with decision rules (if‑then triggers) for re‑modeling as needed.",
        ],
        sources: &["M6.4 Worked examples", "M6.5 Guided practice"],
    },
    Criterion {
        code: "D2",
        name: "Scaffolds & Fading (Generative)",
        weight: 5.0,
        description: "Sentence stems, checklists, partial solutions, compare‑contrast tables; explicit plan to fade supports and provoke self‑explanation.",
        band_notes: [
            "No scaffolds.",
            "Scaffolds named but not shown or not tied to tasks.",
            "Specific artifacts attached and when used.",
            "As 3 + explicit fade steps and timing across tasks.",
            "Well‑timed scaffolds that trigger Constructive/Interactive moves with monitored fade‑out.",
        ],
        sources: &["M6.8 Scaffolds", "M2.D6 Generative scaffolds"],
    },
    Criterion {
        code: "D3",
        name: "Independent Practice & Monitoring",
        weight: 4.0,
        description: "Independent tasks mirror models; circulation/monitoring plan with error interception (mini‑conferences etc.).",
        band_notes: [
            "Homework/worksheet only; no monitoring.",
            "Tasks listed; monitoring approach unclear.",
            "Mirror‑tasks + circulation plan (who/when/what).",
            "As 3 + error‑interception plan.",
            "Exemplary: targeted monitoring by pattern; data informs next tasks.",
        ],
        sources: &["M6.9 Independent practice"],
    },
    // E. Cognitive Load & Adaptation (12)
    Criterion {
        code: "E1",
        name: "Intrinsic Load Sequencing",
        weight: 3.0,
        description: "Simple→complex progression; isolate hard elements before integration; optional goal‑free early tasks.",
        band_notes: [
            "Jumps into complexity; no scaffolding.",
            "Mentions 'start simple' but tasks still complex.",
            "Some segmentation; major topics still overloaded.",
            "Clear simple→complex; isolate then integrate.",
            "As 3 + goal‑free early tasks/self‑paced segments with staged complexity.",
        ],
        sources: &["M7.1 Intrinsic load"],
    },
    Criterion {
        code: "E2",
        name: "Extraneous Load Minimization & Modality",
        weight: 5.0,
        description: "Integrated materials (no split‑attention); signaling; concise on‑screen text; narration aligned with visuals; brief processing pauses.",
        band_notes: [
            "Pervasive split‑attention; read‑aloud slides; long unbroken content.",
            "Occasional integration; mostly fragmented.",
            "Some integrated visuals; reduced duplication; not consistent.",
            "Consistent integration; redundant text removed; timing and pauses planned.",
            "As 4 + learner pace control on transient content; captions are succinct cues.",
        ],
        sources: &["M7.2 Extraneous", "M7.4 Modality"],
    },
    Criterion {
        code: "E3",
        name: "Expertise Adaptation & Load Monitoring",
        weight: 4.0,
        description: "Early probe; novices get more guidance; supports fade; quick effort/load checks (e.g., 1–9) trigger specific adjustments.",
        band_notes: [
            "Same tasks/support for all; no checks.",
            "Vague differentiation; generic exit ticket only.",
            "Some leveled tasks or brief effort checks; actions unclear.",
            "Planned probe + defined if‑then tweaks (raise/lower challenge).",
            "As 4 + revision notes to update materials post‑lesson based on patterns.",
        ],
        sources: &["M7.5 Expertise", "M7.6 Load monitoring"],
    },
    // F. Inclusivity, Culture & Reflection (8)
    Criterion {
        code: "F1",
        name: "UDL & Accessibility",
        weight: 5.0,
        description: "Multiple means of representation/action/engagement; clear instructions; proactive accommodations (captions/alt text/contrast).",
        band_notes: [
            "No inclusivity/accessibility provisions.",
            "Minimal one‑size‑fits‑all instructions; token UDL.",
            "At least one UDL area addressed; limited choice.",
            "Two+ UDL areas with choice; instructions clear for all.",
            "Two+ options in two+ UDL areas + proactive accommodations.",
        ],
        sources: &["M8.7 UDL"],
    },
    Criterion {
        code: "F2",
        name: "Culture of Success & Reflection",
        weight: 3.0,
        description: "Error‑friendly norms; progress tracking; structured reflection linked to ILOs informs next steps.",
        band_notes: [
            "Ranking/competition focus; no reflection.",
            "Positive language but ad‑hoc; optional reflection prompts only.",
            "Some tracking or brief reflection; limited link to ILOs.",
            "Norms/tools normalize errors + reflection linked to ILOs and decisions.",
            "Evidence that reflection generates conceptual change; informs future design/assessment.",
        ],
        sources: &["M1.8 Culture", "M3.4 Reflection"],
    },
];

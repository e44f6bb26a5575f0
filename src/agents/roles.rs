//! Built-in research team
//!
//! Four roles cooperate on a research task:
//!
//! | Agent | Role | Tools | Hands off to |
//! |---|---|---|---|
//! | `PlannerAgent` | planner (entry, finalizer) | none | Search, Writer, Critic |
//! | `SearchAgent` | searcher | `web_search`, `web_scrape` | Writer, Planner |
//! | `WriterAgent` | writer | `read_file`, `write_file` | Critic, Planner |
//! | `CriticAgent` | critic (reviewer) | `read_file` | Writer, Planner |

use crate::agents::{AgentDescriptor, Role};

pub const PLANNER: &str = "PlannerAgent";
pub const SEARCHER: &str = "SearchAgent";
pub const WRITER: &str = "WriterAgent";
pub const CRITIC: &str = "CriticAgent";

const PLANNER_DESCRIPTION: &str =
    "Breaks the research request into subtasks, assigns them to the team and finalizes the report.";

const SEARCHER_DESCRIPTION: &str =
    "Collects sources with web search and web scraping and passes condensed findings on.";

const WRITER_DESCRIPTION: &str =
    "Turns collected findings into a structured markdown report saved with write_file.";

const CRITIC_DESCRIPTION: &str =
    "Reviews the saved report for accuracy, completeness and quality and asks for revisions.";

const CUSTOM_DESCRIPTION: &str = "Specialist member of the research team.";

const PLANNER_INSTRUCTIONS: &str = r#"You are the PlannerAgent and you coordinate a research team.

- Work out the topic and the goals of the user's request. Resolve vague wording with a reasonable, explicitly stated assumption.
- Split the request into concrete subtasks with expected outputs, for example "collect at least 5 credible sources on X".
- Start the work by handing the first subtask to SearchAgent, then keep the work moving one step at a time.
- Team members: SearchAgent gathers sources, WriterAgent writes the report, CriticAgent reviews it.
- When CriticAgent approves the report, reply with the final report file path followed by the word FINISHED."#;

const SEARCHER_INSTRUCTIONS: &str = r#"You are the SearchAgent and you collect material for the research topic.

- Take your subtask from the PlannerAgent.
- Use web_search to find sources and web_scrape to read the most promising pages.
- Gather 3 to 5 sources unless told otherwise. Prefer academic papers, government reports and established news outlets.
- Report each finding briefly together with the file_path returned by the tool, so others can read the full text.
- Hand the findings to WriterAgent. If the material is thin or a tool keeps failing, hand back to PlannerAgent and say what is missing."#;

const WRITER_INSTRUCTIONS: &str = r#"You are the WriterAgent and you turn collected material into a report.

- Read the full texts behind the file paths SearchAgent reported with read_file.
- Extract the key facts, figures, trends and viewpoints relevant to the request.
- Write the report in markdown using this outline:

  # {Headline}
  ## Executive Summary
  ## Background & Context
  ## Key Findings
  ## Impact Analysis
  ## Future Outlook
  ## Expert Insights
  ## Sources

- Save the report with write_file and hand only the returned file path to CriticAgent.
- If the material is incomplete, hand back to PlannerAgent and describe what else is needed."#;

const CRITIC_INSTRUCTIONS: &str = r#"You are the CriticAgent and you review the report.

- Read the report behind the file path WriterAgent gave you with read_file.
- Check it for accuracy, completeness, sourcing and relevance to the user's request.
- If it needs work, hand back to WriterAgent naming what to fix and the file path you reviewed.
- If it is good, hand to PlannerAgent with the approved file path so the run can be finalized.
- Do not ask for more than 3 rounds of revisions."#;

const CUSTOM_INSTRUCTIONS: &str =
    "You are a member of a research team. Complete the part of the task assigned to you, then hand control to the teammate best placed to continue.";

pub fn default_description(role: Role) -> &'static str {
    match role {
        Role::Planner => PLANNER_DESCRIPTION,
        Role::Searcher => SEARCHER_DESCRIPTION,
        Role::Writer => WRITER_DESCRIPTION,
        Role::Critic => CRITIC_DESCRIPTION,
        Role::Custom => CUSTOM_DESCRIPTION,
    }
}

pub fn default_instructions(role: Role) -> &'static str {
    match role {
        Role::Planner => PLANNER_INSTRUCTIONS,
        Role::Searcher => SEARCHER_INSTRUCTIONS,
        Role::Writer => WRITER_INSTRUCTIONS,
        Role::Critic => CRITIC_INSTRUCTIONS,
        Role::Custom => CUSTOM_INSTRUCTIONS,
    }
}

/// Descriptors of the four-agent research team, entry agent first
pub fn default_team() -> Vec<AgentDescriptor> {
    vec![
        AgentDescriptor::new(PLANNER, Role::Planner).with_handoffs([SEARCHER, WRITER, CRITIC]),
        AgentDescriptor::new(SEARCHER, Role::Searcher)
            .with_tools(["web_search", "web_scrape"])
            .with_handoffs([WRITER, PLANNER]),
        AgentDescriptor::new(WRITER, Role::Writer)
            .with_tools(["read_file", "write_file"])
            .with_handoffs([CRITIC, PLANNER]),
        AgentDescriptor::new(CRITIC, Role::Critic)
            .with_tools(["read_file"])
            .with_handoffs([WRITER, PLANNER]),
    ]
}

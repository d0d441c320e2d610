pub mod add_goal;
pub mod check_progress;
pub mod complete_task;
pub mod create_task;
pub mod generate_tasks;
pub mod list_tasks;
pub mod update_goal_progress;

use add_goal::AddGoalParams;
use check_progress::CheckProgressParams;
use complete_task::CompleteTaskParams;
use create_task::CreateTaskParams;
use generate_tasks::GenerateTasksParams;
use list_tasks::ListTasksParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use rusqlite::Connection;
use serde::Serialize;
use update_goal_progress::UpdateGoalProgressParams;

use crate::api::SharedState;
use crate::db::with_conn;
use crate::progression::{Category, Difficulty, Frequency, Priority, Skill};
use crate::suggest::GenerateRequest;
use crate::tracker::types::{NewGoal, NewTask, TaskFilter, TaskSource};
use crate::tracker::{goals, profile, status, tasks};

/// The levelup MCP tool handler. Shares the REST server's state and exposes the
/// tracker operations via the `#[tool_router]` macro.
#[derive(Clone)]
pub struct LevelupTools {
    tool_router: ToolRouter<Self>,
    state: SharedState,
}

/// Skills have no fallback value, so an unknown name is a tool error.
fn parse_skill(value: Option<&str>) -> Result<Option<Skill>, String> {
    value.map(str::parse::<Skill>).transpose()
}

impl LevelupTools {
    /// Run a tracker operation on the shared connection and render the result as JSON.
    async fn run<T, F>(&self, op: F) -> Result<String, String>
    where
        T: Serialize + Send + 'static,
        F: FnOnce(&mut Connection) -> crate::error::Result<T> + Send + 'static,
    {
        let value = with_conn(&self.state.db, op)
            .await
            .map_err(|e| e.to_string())?;
        serde_json::to_string(&value).map_err(|e| format!("serialization failed: {e}"))
    }
}

#[tool_router]
impl LevelupTools {
    pub fn new(state: SharedState) -> Self {
        Self {
            tool_router: Self::tool_router(),
            state,
        }
    }

    #[tool(description = "Summary of XP, level, progress to the next level, open tasks (quests), and active goals.")]
    async fn get_status(&self) -> Result<String, String> {
        tracing::info!("get_status called");
        self.run(status::get_status).await
    }

    #[tool(description = "Full player profile: XP, level, available skill points, and the nine skill values.")]
    async fn get_profile(&self) -> Result<String, String> {
        self.run(profile::get_profile).await
    }

    #[tool(description = "List tasks, newest first. Recurring tasks whose interval has elapsed are reopened first.")]
    async fn list_tasks(
        &self,
        Parameters(params): Parameters<ListTasksParams>,
    ) -> Result<String, String> {
        let filter = TaskFilter {
            completed: params.completed,
            include_inactive: params.include_inactive.unwrap_or(false),
            limit: params.limit,
        };
        self.run(move |conn| tasks::list_tasks(conn, &filter)).await
    }

    #[tool(description = "Create a task. XP is derived from difficulty, base xp, and goal alignment.")]
    async fn create_task(
        &self,
        Parameters(params): Parameters<CreateTaskParams>,
    ) -> Result<String, String> {
        let new = NewTask {
            skill_reward: parse_skill(params.skill_reward.as_deref())?,
            difficulty: params.difficulty.map(Difficulty::from),
            category: params.category.map(Category::from),
            frequency: params.frequency.map(Frequency::from),
            title: params.title,
            description: params.description,
            xp: params.xp,
            goal_alignment: params.goal_alignment,
        };
        tracing::info!(title = %new.title, "create_task called");
        let policy = self.state.config.progression.reward_policy;
        self.run(move |conn| tasks::create_task(conn, &new, TaskSource::Manual, policy))
            .await
    }

    #[tool(description = "Complete a task: awards XP, may level up, advances related goals, and unlocks achievements.")]
    async fn complete_task(
        &self,
        Parameters(params): Parameters<CompleteTaskParams>,
    ) -> Result<String, String> {
        tracing::info!(task_id = %params.task_id, "complete_task called");
        self.run(move |conn| tasks::complete_task(conn, &params.task_id))
            .await
    }

    #[tool(description = "List active goals, highest priority first.")]
    async fn list_goals(&self) -> Result<String, String> {
        self.run(|conn| goals::list_goals(conn)).await
    }

    #[tool(description = "Add a goal with an optional numeric target.")]
    async fn add_goal(
        &self,
        Parameters(params): Parameters<AddGoalParams>,
    ) -> Result<String, String> {
        let new = NewGoal {
            category: Some(params.category.map_or(Category::Financial, Category::from)),
            priority: params.priority.map(Priority::from),
            title: params.title,
            description: params.description,
            target: params.target,
        };
        tracing::info!(title = %new.title, "add_goal called");
        self.run(move |conn| goals::create_goal(conn, &new)).await
    }

    #[tool(description = "Check progress (0.0-1.0) toward a goal by title.")]
    async fn check_progress(
        &self,
        Parameters(params): Parameters<CheckProgressParams>,
    ) -> Result<String, String> {
        self.run(move |conn| {
            let goal = goals::find_goal_by_title(conn, &params.title)?;
            Ok(serde_json::json!({
                "id": goal.id,
                "title": goal.title,
                "progress": goal.progress,
                "completed": goal.completed,
                "target": goal.target,
                "achieved": goal.target.map(|t| t * goal.progress),
            }))
        })
        .await
    }

    #[tool(description = "Set a goal's progress by id or title. Progress only moves forward; 1.0 completes the goal.")]
    async fn update_goal_progress(
        &self,
        Parameters(params): Parameters<UpdateGoalProgressParams>,
    ) -> Result<String, String> {
        let UpdateGoalProgressParams {
            goal_id,
            title,
            progress,
        } = params;
        if goal_id.is_none() && title.is_none() {
            return Err("either goal_id or title is required".into());
        }
        self.run(move |conn| {
            let id = match goal_id {
                Some(id) => id,
                None => goals::find_goal_by_title(conn, title.as_deref().unwrap_or_default())?.id,
            };
            goals::set_goal_progress(conn, &id, progress)
        })
        .await
    }

    #[tool(description = "Ask the local language model for task suggestions and store them as tasks. Falls back to a canned task if the model is unavailable.")]
    async fn generate_tasks(
        &self,
        Parameters(params): Parameters<GenerateTasksParams>,
    ) -> Result<String, String> {
        let request = GenerateRequest {
            category: params.category.map(Category::from).unwrap_or_default(),
            frequency: params.frequency.map_or(Frequency::Daily, Frequency::from),
            goals: params.goals,
            count: params.count,
        };
        tracing::info!(category = %request.category, "generate_tasks called");
        let outcome = self
            .state
            .suggester
            .generate(&self.state.db, request)
            .await
            .map_err(|e| e.to_string())?;
        serde_json::to_string(&outcome).map_err(|e| format!("serialization failed: {e}"))
    }
}

#[tool_handler]
impl ServerHandler for LevelupTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "levelup is a personal progress tracker. Use get_status for an overview, \
                 create_task and complete_task to earn XP, add_goal and check_progress for goals, \
                 and generate_tasks for suggestions."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}

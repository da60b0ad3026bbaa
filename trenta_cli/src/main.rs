use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use trenta_core::format::format_mmss;
use trenta_core::store::APP_LANGUAGE_KEY;
use trenta_core::*;

#[derive(Parser)]
#[command(name = "trenta")]
#[command(about = "30-day workout program and nutrition tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the 30-day program overview
    Program,

    /// Mark a day completed (unlocks the next day)
    CompleteDay {
        /// Day number (1-30)
        number: u32,
    },

    /// Undo a day's completion (the next day stays unlocked)
    UncompleteDay {
        /// Day number (1-30)
        number: u32,
    },

    /// Show or edit one day of the program
    Day {
        /// Day number (1-30)
        number: u32,

        #[command(subcommand)]
        action: Option<DayAction>,
    },

    /// List or edit the exercise catalog
    Exercises {
        /// Filter by category (chest, back, legs, shoulders, arms, core, cardio)
        #[arg(long)]
        category: Option<String>,

        #[command(subcommand)]
        action: Option<ExerciseAction>,
    },

    /// Run a workout session for a day
    Session {
        /// Day number (1-30)
        number: u32,

        /// Auto-complete every set and skip all rests (for testing)
        #[arg(long)]
        auto: bool,
    },

    /// Log and review food intake
    Food {
        #[command(subcommand)]
        action: FoodAction,
    },

    /// Show the daily nutrition goal and today's progress
    Goal,

    /// Show or edit the user profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// Show or set the app language
    Lang {
        /// Language code to set (e.g. en, de)
        code: Option<String>,
    },
}

#[derive(Subcommand)]
enum DayAction {
    /// Add an exercise to the day
    AddExercise { exercise_id: String },

    /// Remove an exercise from the day
    RemoveExercise { exercise_id: String },

    /// Replace one exercise with another
    ReplaceExercise { old_id: String, new_id: String },
}

#[derive(Subcommand)]
enum ExerciseAction {
    /// Add a custom exercise to the catalog
    Add {
        name: String,

        /// chest, back, legs, shoulders, arms, core, cardio
        #[arg(long)]
        category: String,

        #[arg(long, default_value_t = 3)]
        sets: u32,

        #[arg(long, default_value_t = 12)]
        reps: u32,

        /// Working weight in kg
        #[arg(long)]
        weight: Option<f64>,

        /// Rest between sets in seconds
        #[arg(long)]
        rest: Option<u32>,
    },

    /// Remove an exercise (day references are filtered, not repaired)
    Remove { exercise_id: String },
}

#[derive(Subcommand)]
enum FoodAction {
    /// Log a product for today
    Add {
        /// Product id or name fragment
        product: String,

        /// Amount in the product's unit
        amount: f64,

        /// Meal slot (breakfast, lunch, dinner, snack)
        #[arg(long, default_value = "snack")]
        meal: String,
    },

    /// Show a day's entries and totals
    List {
        /// Date (YYYY-MM-DD), default today
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
    },

    /// Remove a logged entry by id
    Remove { entry_id: String },

    /// Set today's burned calories
    Burned { calories: i32 },

    /// Search the product database
    Search { query: String },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the current profile
    Show,

    /// Set profile fields (recomputes the nutrition goal)
    Set {
        #[arg(long)]
        weight: Option<f64>,

        #[arg(long)]
        height: Option<f64>,

        /// sedentary, light, moderate, active, very-active
        #[arg(long)]
        lifestyle: Option<String>,

        /// lose, gain, maintain
        #[arg(long)]
        goal: Option<String>,

        #[arg(long)]
        name: Option<String>,
    },

    /// Record a weight measurement for today
    Weight { kg: f64 },
}

fn main() -> Result<()> {
    trenta_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let store = FileStore::new(data_dir);

    match cli.command {
        Commands::Program => cmd_program(&store),
        Commands::CompleteDay { number } => cmd_complete_day(&store, number, true),
        Commands::UncompleteDay { number } => cmd_complete_day(&store, number, false),
        Commands::Day { number, action } => cmd_day(&store, number, action),
        Commands::Exercises { category, action } => cmd_exercises(&store, category, action),
        Commands::Session { number, auto } => cmd_session(&store, &config, number, auto),
        Commands::Food { action } => cmd_food(&store, action),
        Commands::Goal => cmd_goal(&store),
        Commands::Profile { action } => cmd_profile(&store, action),
        Commands::Lang { code } => cmd_lang(&store, code),
    }
}

fn cmd_program(store: &FileStore) -> Result<()> {
    let program = ProgramEngine::load_or_init(store)?;

    println!("30-Day Program ({}/30 completed)", program.completed_count());
    println!();
    for day in program.days() {
        let marker = if day.completed {
            "[x]"
        } else if day.unlocked {
            "[ ]"
        } else {
            " * "
        };
        let date = day
            .completed_date
            .map(|d| format!("  ({})", d))
            .unwrap_or_default();
        println!("  {} {}{}", marker, day.name, date);
    }
    println!();
    println!("  [x] completed   [ ] unlocked   * locked");
    Ok(())
}

fn cmd_complete_day(store: &FileStore, number: u32, complete: bool) -> Result<()> {
    let mut program = ProgramEngine::load_or_init(store)?;
    let Some(day) = program.day_by_number(number) else {
        return Err(Error::Validation(format!("No day {} in the program", number)));
    };
    let day_id = day.id.clone();

    if complete {
        if !day.unlocked {
            return Err(Error::Validation(format!(
                "Day {} is still locked. Complete day {} first.",
                number,
                number - 1
            )));
        }
        program.mark_completed(store, &SystemClock, &day_id);
        println!("✓ Day {} completed", number);
        if let Some(next) = program.day_by_number(number + 1) {
            if next.unlocked {
                println!("  Day {} is now unlocked", next.day_number);
            }
        }
    } else {
        program.unmark_completed(store, &day_id);
        println!("✓ Day {} un-completed", number);
    }
    Ok(())
}

fn cmd_day(store: &FileStore, number: u32, action: Option<DayAction>) -> Result<()> {
    let mut program = ProgramEngine::load_or_init(store)?;
    let catalog = ExerciseCatalog::load(store)?;
    let Some(day) = program.day_by_number(number) else {
        return Err(Error::Validation(format!("No day {} in the program", number)));
    };
    let day_id = day.id.clone();

    match action {
        Some(DayAction::AddExercise { exercise_id }) => {
            if catalog.get(&exercise_id).is_none() {
                return Err(Error::Validation(format!(
                    "Unknown exercise id: {}",
                    exercise_id
                )));
            }
            program.add_exercise(store, &day_id, &exercise_id);
            println!("✓ Added exercise {} to day {}", exercise_id, number);
        }
        Some(DayAction::RemoveExercise { exercise_id }) => {
            program.remove_exercise(store, &day_id, &exercise_id);
            println!("✓ Removed exercise {} from day {}", exercise_id, number);
        }
        Some(DayAction::ReplaceExercise { old_id, new_id }) => {
            if catalog.get(&new_id).is_none() {
                return Err(Error::Validation(format!("Unknown exercise id: {}", new_id)));
            }
            program.replace_exercise(store, &day_id, &old_id, &new_id);
            println!("✓ Replaced {} with {} on day {}", old_id, new_id, number);
        }
        None => {
            let day = program.day(&day_id).ok_or_else(|| Error::Other("day vanished".into()))?;
            println!("{}", day.name);
            if day.completed {
                match day.completed_date {
                    Some(date) => println!("  Completed on {}", date),
                    None => println!("  Completed"),
                }
            } else if day.unlocked {
                println!("  Unlocked, not yet completed");
            } else {
                println!("  Locked");
            }
            println!();

            let exercises = program.day_exercises(&day_id, &catalog);
            if exercises.is_empty() {
                println!("  Rest day - no exercises");
            } else {
                for exercise in &exercises {
                    print_exercise(exercise);
                }
                println!();
                println!("  Total sets: {}", program.total_sets(&day_id, &catalog));
            }
        }
    }
    Ok(())
}

fn cmd_exercises(
    store: &FileStore,
    category: Option<String>,
    action: Option<ExerciseAction>,
) -> Result<()> {
    let mut catalog = ExerciseCatalog::load(store)?;

    match action {
        Some(ExerciseAction::Add {
            name,
            category,
            sets,
            reps,
            weight,
            rest,
        }) => {
            let Some(category) = ExerciseCategory::parse(&category) else {
                return Err(Error::Validation(format!("Unknown category: {}", category)));
            };
            let id = catalog.add(
                store,
                Exercise {
                    id: String::new(),
                    name,
                    category,
                    sets,
                    reps,
                    weight,
                    rest_time_seconds: rest,
                    notes: None,
                    difficulty: None,
                    location: None,
                    equipment: Vec::new(),
                },
            )?;
            println!("✓ Exercise added with id {}", id);
            return Ok(());
        }
        Some(ExerciseAction::Remove { exercise_id }) => {
            if catalog.remove(store, &exercise_id) {
                println!("✓ Exercise {} removed", exercise_id);
            } else {
                println!("No exercise with id {}", exercise_id);
            }
            return Ok(());
        }
        None => {}
    }

    match category {
        Some(name) => {
            let Some(category) = ExerciseCategory::parse(&name) else {
                return Err(Error::Validation(format!("Unknown category: {}", name)));
            };
            println!("{} exercises:", category.label());
            for exercise in catalog.by_category(category) {
                print_exercise(exercise);
            }
        }
        None => {
            for category in ExerciseCategory::ALL {
                let exercises = catalog.by_category(category);
                if exercises.is_empty() {
                    continue;
                }
                println!("{}:", category.label());
                for exercise in exercises {
                    print_exercise(exercise);
                }
                println!();
            }
        }
    }
    Ok(())
}

fn print_exercise(exercise: &Exercise) {
    let rest = exercise
        .rest_time_seconds
        .map(|s| format!(", rest {}", format_mmss(s)))
        .unwrap_or_default();
    println!(
        "  [{}] {} - {}x{}{}",
        exercise.id, exercise.name, exercise.sets, exercise.reps, rest
    );
}

fn cmd_session(store: &FileStore, config: &Config, number: u32, auto: bool) -> Result<()> {
    let mut program = ProgramEngine::load_or_init(store)?;
    let catalog = ExerciseCatalog::load(store)?;
    let Some(day) = program.day_by_number(number) else {
        return Err(Error::Validation(format!("No day {} in the program", number)));
    };
    if !day.unlocked {
        return Err(Error::Validation(format!("Day {} is still locked", number)));
    }
    let day_id = day.id.clone();
    let day_name = day.name.clone();
    let exercises = program.day_exercises(&day_id, &catalog);

    let mut session = SessionEngine::new(&config.session);
    let Some(mut handle) = session.begin(exercises) else {
        println!("{} is a rest day - nothing to train.", day_name);
        return Ok(());
    };

    println!("Starting {}", day_name);

    // Pre-start countdown
    while session.phase() == SessionPhase::Countdown {
        if let Some(left) = session.start_countdown() {
            println!("  Starting in {}...", left);
        }
        if !auto {
            std::thread::sleep(Duration::from_secs(1));
        }
        session.tick(handle);
    }

    loop {
        match session.phase() {
            SessionPhase::InExercise => {
                let exercise = session
                    .current_exercise()
                    .ok_or_else(|| Error::Other("no active exercise".into()))?
                    .clone();
                let (filled, total) = session.set_dots(&exercise);
                println!();
                println!(
                    "  [{}/{}] {} - set {}/{} ({} reps)",
                    session.current_index() + 1,
                    session.exercise_count(),
                    exercise.name,
                    filled + 1,
                    total,
                    exercise.reps
                );

                if !auto {
                    prompt_enter("  Press Enter when the set is done")?;
                }
                session.complete_set(&exercise.id);
            }
            SessionPhase::Resting => {
                if let Some(left) = session.rest_countdown() {
                    println!("  Rest: {}", format_mmss(left));
                }
                if auto {
                    session.skip_rest();
                } else {
                    handle = match session.handle() {
                        Some(h) => h,
                        None => continue,
                    };
                    std::thread::sleep(Duration::from_secs(1));
                    session.tick(handle);
                }
            }
            SessionPhase::AwaitingConfirmation => {
                println!();
                let confirm = if auto {
                    true
                } else {
                    prompt_yes_no("  All exercises done. Finish the workout? [Y/n]")?
                };
                if confirm {
                    session.finish();
                } else {
                    // Declining leaves the session waiting; re-prompt
                    session.decline_finish();
                }
            }
            SessionPhase::Finished => {
                program.mark_completed(store, &SystemClock, &day_id);
                println!("✓ Workout finished. Day {} marked completed.", number);
                return Ok(());
            }
            SessionPhase::NotStarted | SessionPhase::NoExercises => {
                return Ok(());
            }
            SessionPhase::Countdown => unreachable!("countdown already ran"),
        }
    }
}

fn cmd_food(store: &FileStore, action: FoodAction) -> Result<()> {
    let profile = ProfileStore::load(store)?;
    let mut log = NutritionLog::load(store, profile.data())?;

    match action {
        FoodAction::Add {
            product,
            amount,
            meal,
        } => {
            let Some(meal_type) = MealType::parse(&meal) else {
                return Err(Error::Validation(format!("Unknown meal: {}", meal)));
            };
            let products = default_products();
            let found = products
                .iter()
                .find(|p| p.id == product)
                .or_else(|| search_products(products, &product).into_iter().next());
            let Some(found) = found else {
                return Err(Error::Validation(format!("No product matches '{}'", product)));
            };

            let id = log.add_entry(store, &SystemClock, found, amount, meal_type)?;
            println!(
                "✓ Logged {} {} of {} ({})",
                amount,
                unit_label(found.unit),
                found.name,
                meal_type.label()
            );
            println!("  Entry id: {}", id);
        }
        FoodAction::List { date } => {
            let date = date.unwrap_or_else(|| SystemClock.today());
            let day = log.day(date);
            let goal = *log.goal();

            println!("Nutrition for {}", date);
            if day.entries.is_empty() {
                println!("  No entries");
            }
            for entry in &day.entries {
                println!(
                    "  [{}] {} x{} ({} kcal, {})",
                    entry.id,
                    entry.product_name,
                    entry.amount,
                    entry.calories,
                    entry.meal_type.label()
                );
            }
            println!();
            println!(
                "  Total: {} kcal / {}g protein / {}g carbs / {}g fat",
                day.total_calories, day.total_protein, day.total_carbs, day.total_fat
            );
            if day.burned_calories > 0 {
                println!("  Burned: {} kcal", day.burned_calories);
            }
            println!("  Remaining: {} kcal", day.display_remaining(&goal));

            for rec in recommendations(&day, &goal) {
                println!("  - {}", rec.message);
            }
        }
        FoodAction::Remove { entry_id } => {
            if log.remove_entry(store, &entry_id) {
                println!("✓ Entry removed");
            } else {
                println!("No entry with id {}", entry_id);
            }
        }
        FoodAction::Burned { calories } => {
            log.set_burned_calories(store, &SystemClock, calories);
            println!("✓ Burned calories set to {}", calories);
        }
        FoodAction::Search { query } => {
            let results = search_products(default_products(), &query);
            if results.is_empty() {
                println!("No products match '{}'", query);
            }
            for product in results {
                println!(
                    "  [{}] {} - {} kcal per {} {} ({})",
                    product.id,
                    product.name,
                    product.calories,
                    product.default_amount,
                    unit_label(product.unit),
                    product.category.label()
                );
            }
        }
    }
    Ok(())
}

fn cmd_goal(store: &FileStore) -> Result<()> {
    let profile = ProfileStore::load(store)?;
    let log = NutritionLog::load(store, profile.data())?;
    let goal = *log.goal();
    let day = log.day(SystemClock.today());

    println!("Daily goal:");
    println!("  Calories: {} kcal", goal.daily_calories);
    println!("  Protein:  {} g", goal.protein_g);
    println!("  Carbs:    {} g", goal.carbs_g);
    println!("  Fat:      {} g", goal.fat_g);
    println!();
    println!(
        "Today: {} kcal eaten, {} kcal remaining",
        day.total_calories,
        day.display_remaining(&goal)
    );
    if day.burned_calories > 0 {
        // The headline remaining credits burned calories; the plain
        // goal-minus-eaten figure is shown alongside
        println!(
            "  ({} kcal burned; {} kcal remaining before activity)",
            day.burned_calories,
            goal.daily_calories - day.total_calories
        );
    }

    let recs = recommendations(&day, &goal);
    if !recs.is_empty() {
        println!();
        for rec in recs {
            println!("  - {}", rec.message);
        }
    }
    if profile.data().weight_kg.is_none() || profile.data().height_cm.is_none() {
        println!();
        println!("Using the default goal. Set weight and height to personalize:");
        println!("  trenta profile set --weight 70 --height 175");
    }
    Ok(())
}

fn cmd_profile(store: &FileStore, action: Option<ProfileAction>) -> Result<()> {
    let mut profile = ProfileStore::load(store)?;

    match action.unwrap_or(ProfileAction::Show) {
        ProfileAction::Show => {
            let data = profile.data();
            println!("Profile:");
            if let Some(name) = &data.name {
                println!("  Name:      {}", name);
            }
            match data.weight_kg {
                Some(w) => println!("  Weight:    {}", trenta_core::format::format_weight(w)),
                None => println!("  Weight:    not set"),
            }
            match data.height_cm {
                Some(h) => println!("  Height:    {} cm", h),
                None => println!("  Height:    not set"),
            }
            if let Some(lifestyle) = data.lifestyle {
                println!("  Lifestyle: {:?}", lifestyle);
            }
            if let Some(goal) = data.goal {
                println!("  Goal:      {:?}", goal);
            }
            if let (Some(bmi), Some(class)) = (profile.bmi(), profile.bmi_class()) {
                println!("  BMI:       {} ({})", bmi, class.label());
            }
            if !profile.data().weight_history.is_empty() {
                println!();
                println!("  Weight history:");
                for entry in &profile.data().weight_history {
                    println!(
                        "    {}  {}",
                        entry.date,
                        trenta_core::format::format_weight(entry.weight)
                    );
                }
            }
        }
        ProfileAction::Set {
            weight,
            height,
            lifestyle,
            goal,
            name,
        } => {
            let lifestyle = match lifestyle {
                Some(s) => Some(parse_lifestyle(&s)?),
                None => None,
            };
            let goal = match goal {
                Some(s) => Some(parse_goal(&s)?),
                None => None,
            };

            profile.update(store, |data| {
                if weight.is_some() {
                    data.weight_kg = weight;
                }
                if height.is_some() {
                    data.height_cm = height;
                }
                if lifestyle.is_some() {
                    data.lifestyle = lifestyle;
                }
                if goal.is_some() {
                    data.goal = goal;
                }
                if name.is_some() {
                    data.name = name;
                }
            })?;

            // Biometrics feed the nutrition goal; recompute on every change
            let mut log = NutritionLog::load(store, profile.data())?;
            let new_goal = log.refresh_goal(store, profile.data());
            println!("✓ Profile updated");
            println!("  Daily goal: {} kcal", new_goal.daily_calories);
        }
        ProfileAction::Weight { kg } => {
            profile.add_weight_entry(store, &SystemClock, kg)?;
            let mut log = NutritionLog::load(store, profile.data())?;
            log.refresh_goal(store, profile.data());
            println!("✓ Weight recorded: {}", trenta_core::format::format_weight(kg));
        }
    }
    Ok(())
}

fn cmd_lang(store: &FileStore, code: Option<String>) -> Result<()> {
    match code {
        Some(code) => {
            store.set(APP_LANGUAGE_KEY, &format!("\"{}\"", code))?;
            println!("✓ Language set to {}", code);
        }
        None => {
            let current = store
                .get(APP_LANGUAGE_KEY)?
                .map(|blob| blob.trim_matches('"').to_string())
                .unwrap_or_else(|| "en".to_string());
            println!("Language: {}", current);
        }
    }
    Ok(())
}

fn unit_label(unit: FoodUnit) -> &'static str {
    match unit {
        FoodUnit::G => "g",
        FoodUnit::Ml => "ml",
        FoodUnit::Piece => "pc",
        FoodUnit::Cup => "cup",
        FoodUnit::Tbsp => "tbsp",
        FoodUnit::Tsp => "tsp",
    }
}

fn parse_lifestyle(s: &str) -> Result<Lifestyle> {
    match s {
        "sedentary" => Ok(Lifestyle::Sedentary),
        "light" => Ok(Lifestyle::Light),
        "moderate" => Ok(Lifestyle::Moderate),
        "active" => Ok(Lifestyle::Active),
        "very-active" => Ok(Lifestyle::VeryActive),
        _ => Err(Error::Validation(format!("Unknown lifestyle: {}", s))),
    }
}

fn parse_goal(s: &str) -> Result<GoalKind> {
    match s {
        "lose" => Ok(GoalKind::Lose),
        "gain" => Ok(GoalKind::Gain),
        "maintain" => Ok(GoalKind::Maintain),
        _ => Err(Error::Validation(format!("Unknown goal: {}", s))),
    }
}

fn prompt_enter(message: &str) -> Result<()> {
    println!("{}", message);
    print!("> ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(())
}

fn prompt_yes_no(message: &str) -> Result<bool> {
    println!("{}", message);
    print!("> ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(!matches!(input.trim().to_lowercase().as_str(), "n" | "no"))
}

use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use magicube::optimizer::runner::TrialSummary;
use magicube::recorder::{RunRecord, SwapCounter, Termination};
use magicube::scorer::CostBreakdown;
use magicube::CubeState;

// Moves shown at the end of a trace
const TRACE_TAIL: usize = 10;

pub fn print_cube(cube: &CubeState) {
    for (l, level) in cube.to_nested().iter().enumerate() {
        println!("\nLevel {}", l);
        let mut table = Table::new();
        table.load_preset(ASCII_FULL);
        for row in level {
            let cells: Vec<Cell> = row
                .iter()
                .map(|v| Cell::new(v).set_alignment(CellAlignment::Right))
                .collect();
            table.add_row(cells);
        }
        println!("{}", table);
    }
}

fn termination_cell(t: Termination) -> Cell {
    let cell = Cell::new(t.to_string());
    match t {
        Termination::Solved => cell.fg(Color::Green).add_attribute(Attribute::Bold),
        Termination::BudgetExhausted | Termination::TemperatureFloor => cell.fg(Color::Yellow),
        _ => cell.fg(Color::Red),
    }
}

pub fn print_trials(summary: &TrialSummary) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Trial").add_attribute(Attribute::Bold),
        Cell::new("Strategy"),
        Cell::new("Objective"),
        Cell::new("Initial"),
        Cell::new("Final").fg(Color::Cyan),
        Cell::new("Violations").fg(Color::Red),
        Cell::new("Weighted"),
        Cell::new("Iter"),
        Cell::new("Stop"),
        Cell::new("Time (s)"),
    ]);

    for (i, r) in summary.runs.iter().enumerate() {
        let label = if i == summary.best {
            Cell::new(format!("#{} *", i))
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new(format!("#{}", i))
        };
        table.add_row(vec![
            label,
            Cell::new(r.strategy.to_string()),
            Cell::new(r.objective.to_string()),
            Cell::new(format!("{:.2}", r.initial_cost)),
            Cell::new(format!("{:.2}", r.final_cost)).fg(Color::Cyan),
            Cell::new(r.violations).fg(Color::Red),
            Cell::new(format!("{:.2}", r.weighted_cost)),
            Cell::new(r.iterations),
            termination_cell(r.termination),
            Cell::new(format!("{:.3}", r.duration_secs)),
        ]);
    }
    println!("\n{}", table);
    println!(
        "Solved {}/{} trial(s).",
        summary.solved_count(),
        summary.runs.len()
    );
}

pub fn print_run_details(r: &RunRecord) {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.add_row(vec![
        Cell::new("Detail").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Accepted moves"), Cell::new(r.moves.len())]);
    if !r.generations.is_empty() {
        table.add_row(vec![Cell::new("Generations"), Cell::new(r.generations.len())]);
    }
    if !r.iterations_per_restart.is_empty() {
        let per: Vec<String> = r
            .iterations_per_restart
            .iter()
            .map(|n| n.to_string())
            .collect();
        table.add_row(vec![
            Cell::new("Iterations per restart"),
            Cell::new(per.join(", ")),
        ]);
    }
    if r.sideways_moves > 0 {
        table.add_row(vec![Cell::new("Sideways moves"), Cell::new(r.sideways_moves)]);
    }
    if r.stuck_count > 0 {
        table.add_row(vec![Cell::new("Stuck windows"), Cell::new(r.stuck_count)]);
    }
    println!("\n{}", table);

    if let Some(stats) = &r.swap_stats {
        let mut st = Table::new();
        st.load_preset(ASCII_FULL);
        st.add_row(vec![
            Cell::new("Candidate").add_attribute(Attribute::Bold),
            Cell::new("Attempts"),
            Cell::new("Improvements"),
            Cell::new("Rate"),
        ]);
        let rows: [(&str, &SwapCounter); 4] = [
            ("within_line", &stats.within_line),
            ("cross_line", &stats.cross_line),
            ("random", &stats.random),
            ("exhaustive", &stats.exhaustive),
        ];
        for (name, c) in rows {
            if c.attempts == 0 {
                continue;
            }
            st.add_row(vec![
                Cell::new(name),
                Cell::new(c.attempts),
                Cell::new(c.improvements),
                Cell::new(format!("{:.3}", c.success_rate())),
            ]);
        }
        println!("{}", st);
    }

    if !r.moves.is_empty() {
        let mut mt = Table::new();
        mt.load_preset(ASCII_FULL);
        mt.add_row(vec![
            Cell::new("Iter").add_attribute(Attribute::Bold),
            Cell::new("From"),
            Cell::new("To"),
            Cell::new("Cost"),
            Cell::new("P(accept)"),
        ]);
        let skip = r.moves.len().saturating_sub(TRACE_TAIL);
        for m in &r.moves[skip..] {
            let (a, b) = m.coords(r.size);
            mt.add_row(vec![
                Cell::new(m.iteration),
                Cell::new(format!("({},{},{})", a.level, a.row, a.col)),
                Cell::new(format!("({},{},{})", b.level, b.row, b.col)),
                Cell::new(format!("{:.2}", m.cost)),
                Cell::new(
                    m.acceptance
                        .map(|p| format!("{:.4}", p))
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ]);
        }
        println!("Last {} move(s):\n{}", r.moves.len() - skip, mt);
    }
}

pub fn print_breakdown(b: &CostBreakdown) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Category").add_attribute(Attribute::Bold),
        Cell::new("Lines"),
        Cell::new("Violations").fg(Color::Red),
        Cell::new("Total Dev"),
        Cell::new("Max Dev"),
        Cell::new("Penalized").fg(Color::Yellow),
    ]);
    for c in &b.categories {
        table.add_row(vec![
            Cell::new(c.category.to_string()).add_attribute(Attribute::Bold),
            Cell::new(c.lines),
            Cell::new(c.violations).fg(Color::Red),
            Cell::new(c.total_deviation),
            Cell::new(c.max_deviation),
            Cell::new(c.penalized_lines).fg(Color::Yellow),
        ]);
    }
    println!("\n{}", table);

    let status = if b.is_solved() {
        Cell::new("MAGIC").fg(Color::Green).add_attribute(Attribute::Bold)
    } else {
        Cell::new("NOT MAGIC").fg(Color::Red)
    };
    let mut summary = Table::new();
    summary.load_preset(ASCII_FULL);
    summary.add_row(vec![Cell::new("Magic number"), Cell::new(b.magic_number)]);
    summary.add_row(vec![
        Cell::new("Violations"),
        Cell::new(format!("{} / {}", b.violations, b.total_lines)),
    ]);
    summary.add_row(vec![
        Cell::new("Weighted cost"),
        Cell::new(format!("{:.3}", b.weighted_cost)).fg(Color::Cyan),
    ]);
    summary.add_row(vec![
        Cell::new("Deviation std"),
        Cell::new(format!("{:.3}", b.deviation_std)),
    ]);
    summary.add_row(vec![Cell::new("Status"), status]);
    println!("{}", summary);

    if !b.worst_lines.is_empty() {
        let mut wt = Table::new();
        wt.load_preset(ASCII_FULL);
        wt.add_row(vec![
            Cell::new("Worst line").add_attribute(Attribute::Bold),
            Cell::new("Category"),
            Cell::new("Cells"),
            Cell::new("Sum"),
            Cell::new("Deviation").fg(Color::Red),
        ]);
        for l in &b.worst_lines {
            let cells: Vec<String> = l
                .cells
                .iter()
                .map(|c| format!("({},{},{})", c.level, c.row, c.col))
                .collect();
            wt.add_row(vec![
                Cell::new(l.line),
                Cell::new(l.category.to_string()),
                Cell::new(cells.join(" ")),
                Cell::new(l.sum),
                Cell::new(l.deviation).fg(Color::Red),
            ]);
        }
        println!("{}", wt);
    }
}

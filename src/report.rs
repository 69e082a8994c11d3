use std::fmt::Write as _;

use crate::analytics::FullReport;
use crate::error::{Result, StoreError};
use crate::model::JournalEntry;

/// Byte-order mark so spreadsheet software opens the CSV as UTF-8.
const BOM: char = '\u{FEFF}';

/// Render the full report into the fixed plain-text layout. Deterministic
/// for a given report.
pub fn render_text(report: &FullReport) -> String {
    let mut out = String::new();

    out.push_str("╔══════════════════════════════════════════╗\n");
    out.push_str("║         RELATÓRIO DE BEM-ESTAR           ║\n");
    out.push_str("╚══════════════════════════════════════════╝\n\n");
    let _ = writeln!(
        out,
        "Gerado em: {}\n",
        report.generated_at.format("%d/%m/%Y %H:%M")
    );

    out.push_str("=== ESTATÍSTICAS GERAIS ===\n");
    let stats = &report.statistics;
    let _ = writeln!(out, "Nível: {}", stats.level);
    let _ = writeln!(out, "XP: {}", stats.xp);
    let _ = writeln!(out, "Sequência de check-ins: {} dias", stats.check_in_streak);
    let _ = writeln!(out, "Conquistas: {}", stats.badges);
    out.push('\n');

    if let Some(mood) = &report.mood {
        out.push_str("=== ANÁLISE DE HUMOR ===\n");
        let _ = writeln!(
            out,
            "Média dos últimos 7 registros: {:.1}",
            mood.week_average
        );
        let _ = writeln!(
            out,
            "Média dos últimos 30 registros: {:.1}",
            mood.month_average
        );
        let _ = writeln!(out, "Tendência: {}", mood.trend.describe());
        if let Some(day) = mood.best_day {
            let _ = writeln!(out, "Melhor dia: {}", day);
        }
        if let Some(day) = mood.worst_day {
            let _ = writeln!(out, "Dia mais difícil: {}", day);
        }
        out.push('\n');
    }

    out.push_str("=== PRODUTIVIDADE ===\n");
    let prod = &report.productivity;
    let _ = writeln!(
        out,
        "Metas concluídas: {}/{} ({:.1}%)",
        prod.completed_goals, prod.total_goals, prod.goal_completion_rate
    );
    let _ = writeln!(
        out,
        "Desafios concluídos: {:.1}%",
        prod.challenge_completion_rate
    );
    if let Some(days) = prod.average_completion_days {
        let _ = writeln!(out, "Tempo médio de conclusão: {:.1} dias", days);
    }
    out.push('\n');

    out.push_str("=== RECOMENDAÇÕES ===\n");
    if report.recommendations.is_empty() {
        out.push_str("Nenhuma recomendação no momento. Continue assim!\n");
    } else {
        for (i, rec) in report.recommendations.iter().enumerate() {
            let _ = writeln!(out, "{}. [{}] {}", i + 1, rec.priority, rec.title);
            let _ = writeln!(out, "   {}", rec.description);
        }
    }

    out
}

/// Journal entries as CSV (Data, Conteúdo, Humor), BOM-prefixed.
pub fn journal_csv(entries: &[JournalEntry]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["Data", "Conteúdo", "Humor"])
        .map_err(|e| StoreError::Persistence(format!("CSV export failed: {}", e)))?;
    for entry in entries {
        writer
            .write_record([
                entry.date.as_str(),
                entry.content.as_str(),
                entry.mood.display_name(),
            ])
            .map_err(|e| StoreError::Persistence(format!("CSV export failed: {}", e)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| StoreError::Persistence(format!("CSV export failed: {}", e)))?;
    let body = String::from_utf8(bytes)
        .map_err(|e| StoreError::Persistence(format!("CSV export failed: {}", e)))?;
    Ok(format!("{}{}", BOM, body))
}

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::analytics::AnalyticsEngine;
use crate::catalog;
use crate::config::Config;
use crate::events::StoreEvent;
use crate::mood::MoodLabel;
use crate::report;
use crate::storage::Storage;
use crate::store::{DateDirection, WellnessStore};

#[derive(Parser)]
#[command(name = "bem")]
#[command(about = "Acompanhamento de bem-estar: humor, diário, metas e conquistas")]
pub struct Args {
    /// Diretório onde os dados ficam guardados
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inicia uma sessão nova com o seu nome (apaga dados anteriores)
    Login { nome: String },
    /// Registra como você está se sentindo hoje
    Checkin {
        /// pessimo, ruim, neutro, bom, otimo ou feliz
        humor: String,
        #[arg(long)]
        nota: Option<String>,
    },
    /// Metas pessoais
    Meta {
        #[command(subcommand)]
        command: MetaCommands,
    },
    /// Diário pessoal
    Diario {
        #[command(subcommand)]
        command: DiarioCommands,
    },
    /// Desafios de bem-estar
    Desafio {
        #[command(subcommand)]
        command: DesafioCommands,
    },
    /// Agenda de consultas
    Agenda {
        #[command(subcommand)]
        command: AgendaCommands,
    },
    /// Mensagens recebidas
    Mensagem {
        #[command(subcommand)]
        command: MensagemCommands,
    },
    /// Autoavaliações de bem-estar
    Avaliacao {
        #[command(subcommand)]
        command: AvaliacaoCommands,
    },
    /// Estatísticas gerais
    Stats,
    /// Conquistas obtidas
    Conquistas,
    /// Relatório completo de bem-estar
    Relatorio {
        /// Grava o relatório em um arquivo em vez de imprimir
        #[arg(long)]
        saida: Option<PathBuf>,
    },
    /// Exporta o diário como CSV
    ExportarDiario {
        #[arg(long)]
        saida: Option<PathBuf>,
    },
    /// Grava um backup JSON de todos os dados
    Backup { arquivo: PathBuf },
    /// Restaura os dados a partir de um backup JSON
    Restaurar { arquivo: PathBuf },
    /// Apaga todos os dados
    Reset,
}

#[derive(Subcommand)]
pub enum MetaCommands {
    /// Cria uma meta
    Add { titulo: String },
    /// Lista as metas
    List,
    /// Marca ou desmarca uma meta como concluída
    Toggle { id: i64 },
    /// Remove uma meta
    Rm { id: i64 },
}

#[derive(Subcommand)]
pub enum DiarioCommands {
    /// Escreve uma entrada nova
    Add { texto: String },
    /// Lista as entradas (mais recentes primeiro)
    List,
    /// Edita uma entrada existente
    Edit { id: i64, texto: String },
    /// Remove uma entrada
    Rm { id: i64 },
}

#[derive(Subcommand)]
pub enum DesafioCommands {
    /// Lista os desafios disponíveis
    List,
    /// Marca um desafio como completado
    Done { id: String },
}

#[derive(Subcommand)]
pub enum AgendaCommands {
    /// Agenda uma consulta (data YYYY-MM-DD, hora HH:MM)
    Book {
        data: String,
        hora: String,
        #[arg(long, default_value = "Profissional de saúde")]
        profissional: String,
        #[arg(long, default_value = "")]
        motivo: String,
    },
    /// Cancela uma consulta
    Cancel { id: i64 },
    /// Lista as consultas agendadas
    List,
    /// Mostra os horários livres do dia selecionado
    Slots,
    /// Volta o dia selecionado da agenda
    Prev,
    /// Avança o dia selecionado da agenda
    Next,
}

#[derive(Subcommand)]
pub enum MensagemCommands {
    /// Registra uma mensagem recebida
    Add { de: String, texto: String },
    /// Lista as mensagens e marca como lidas
    List,
}

#[derive(Subcommand)]
pub enum AvaliacaoCommands {
    /// Registra uma autoavaliação (nota de 0 a 10)
    Add {
        nota: u32,
        #[arg(long)]
        obs: Option<String>,
    },
    /// Lista as autoavaliações
    List,
}

pub fn run(args: Args) -> Result<()> {
    let mut store = open_store(args.data_dir)?;

    match args.command {
        Commands::Login { nome } => {
            store.login(&nome)?;
            store.flush()?;
            println!("👋 Bem-vindo(a), {}!", nome.trim());
        }
        Commands::Checkin { humor, nota } => {
            let mood: MoodLabel = humor.parse().map_err(anyhow::Error::msg)?;
            let outcome = store.record_feeling(mood, nota);
            store.flush()?;
            println!("✅ Humor registrado: {} {}", mood.emoji(), mood.display_name());
            if outcome.continued {
                println!("🔥 Sequência de check-ins: {} dia(s)", outcome.streak);
            } else {
                println!("Você já tinha feito check-in hoje. Sequência: {} dia(s)", outcome.streak);
            }
        }
        Commands::Meta { command } => handle_meta(&mut store, command)?,
        Commands::Diario { command } => handle_diario(&mut store, command)?,
        Commands::Desafio { command } => handle_desafio(&mut store, command)?,
        Commands::Agenda { command } => handle_agenda(&mut store, command)?,
        Commands::Mensagem { command } => handle_mensagem(&mut store, command)?,
        Commands::Avaliacao { command } => handle_avaliacao(&mut store, command)?,
        Commands::Stats => handle_stats(&store),
        Commands::Conquistas => handle_conquistas(&store),
        Commands::Relatorio { saida } => {
            let full = AnalyticsEngine::new(&store).generate_full_report();
            let text = report::render_text(&full);
            match saida {
                Some(path) => {
                    std::fs::write(&path, &text)?;
                    println!("📄 Relatório gravado em {}", path.display());
                }
                None => print!("{}", text),
            }
        }
        Commands::ExportarDiario { saida } => {
            let csv_text = report::journal_csv(&store.document().journal_entries)?;
            match saida {
                Some(path) => {
                    std::fs::write(&path, &csv_text)?;
                    println!("📄 Diário exportado para {}", path.display());
                }
                None => print!("{}", csv_text),
            }
        }
        Commands::Backup { arquivo } => {
            let raw = store.export_data()?;
            std::fs::write(&arquivo, raw)?;
            println!("💾 Backup gravado em {}", arquivo.display());
        }
        Commands::Restaurar { arquivo } => {
            let raw = std::fs::read_to_string(&arquivo)?;
            store.import_data(&raw)?;
            println!("♻️  Dados restaurados de {}", arquivo.display());
        }
        Commands::Reset => {
            store.reset();
            println!("🗑️  Todos os dados foram apagados.");
        }
    }

    Ok(())
}

fn open_store(data_dir: Option<PathBuf>) -> Result<WellnessStore> {
    let config = Config::new(data_dir)?;
    let mut store = WellnessStore::new(Storage::new(config.state_file()));
    store.subscribe(Box::new(|event| match event {
        StoreEvent::LevelUp { level } => {
            println!("⬆️  Você subiu para o nível {}!", level);
        }
        StoreEvent::BadgeAwarded { badge } => {
            println!("{} Nova conquista: {}! {}", badge.icon, badge.title, badge.description);
        }
        _ => {}
    }));
    Ok(store)
}

fn handle_meta(store: &mut WellnessStore, command: MetaCommands) -> Result<()> {
    match command {
        MetaCommands::Add { titulo } => {
            let goal = store.add_goal(&titulo)?;
            store.flush()?;
            println!("🎯 Meta criada (id {}): {}", goal.id, goal.title);
        }
        MetaCommands::List => {
            let goals = &store.document().goals;
            if goals.is_empty() {
                println!("Nenhuma meta ainda. Crie uma com `bem meta add`.");
            }
            for goal in goals {
                let mark = if goal.completed { "✅" } else { "⬜" };
                println!("{} {} - {}", mark, goal.id, goal.title);
            }
        }
        MetaCommands::Toggle { id } => {
            let goal = store.toggle_goal(id)?;
            store.flush()?;
            if goal.completed {
                println!("🎉 Meta concluída: {}", goal.title);
            } else {
                println!("↩️  Meta reaberta: {}", goal.title);
            }
        }
        MetaCommands::Rm { id } => {
            if store.delete_goal(id) {
                store.flush()?;
                println!("🗑️  Meta removida.");
            } else {
                println!("Meta {} não encontrada.", id);
            }
        }
    }
    Ok(())
}

fn handle_diario(store: &mut WellnessStore, command: DiarioCommands) -> Result<()> {
    match command {
        DiarioCommands::Add { texto } => {
            let entry = store.save_journal_entry(&texto, None)?;
            store.flush()?;
            println!(
                "📝 Entrada criada (id {}) com humor {} {}",
                entry.id,
                entry.mood.emoji(),
                entry.mood.display_name()
            );
        }
        DiarioCommands::List => {
            let entries = &store.document().journal_entries;
            if entries.is_empty() {
                println!("O diário está vazio. Escreva com `bem diario add`.");
            }
            for entry in entries.iter().rev() {
                println!(
                    "📝 {} [{}] {} {}",
                    entry.id,
                    entry.date,
                    entry.mood.emoji(),
                    entry.content
                );
            }
        }
        DiarioCommands::Edit { id, texto } => {
            let entry = store.save_journal_entry(&texto, Some(id))?;
            store.flush()?;
            println!("✏️  Entrada {} atualizada.", entry.id);
        }
        DiarioCommands::Rm { id } => {
            store.delete_journal_entry(id)?;
            store.flush()?;
            println!("🗑️  Entrada removida.");
        }
    }
    Ok(())
}

fn handle_desafio(store: &mut WellnessStore, command: DesafioCommands) -> Result<()> {
    match command {
        DesafioCommands::List => {
            let done = &store.document().profile.completed_challenges;
            for challenge in catalog::challenges() {
                let mark = if done.iter().any(|c| c == challenge.id) {
                    "✅"
                } else {
                    "⬜"
                };
                println!(
                    "{} {} - {} (+{} XP): {}",
                    mark, challenge.id, challenge.title, challenge.xp, challenge.description
                );
            }
        }
        DesafioCommands::Done { id } => {
            let challenge = store.complete_challenge(&id)?;
            store.flush()?;
            println!("🏆 Desafio completado: {} (+{} XP)", challenge.title, challenge.xp);
        }
    }
    Ok(())
}

fn handle_agenda(store: &mut WellnessStore, command: AgendaCommands) -> Result<()> {
    match command {
        AgendaCommands::Book {
            data,
            hora,
            profissional,
            motivo,
        } => {
            let appt = store.schedule_appointment(&data, &hora, &profissional, &motivo)?;
            store.flush()?;
            println!(
                "📅 Consulta agendada para {} com {} (id {})",
                appt.date, appt.professional, appt.id
            );
        }
        AgendaCommands::Cancel { id } => {
            store.cancel_appointment(id)?;
            store.flush()?;
            println!("🗑️  Consulta cancelada.");
        }
        AgendaCommands::List => {
            let appointments = &store.document().appointments;
            if appointments.is_empty() {
                println!("Nenhuma consulta agendada.");
            }
            for appt in appointments {
                println!(
                    "📅 {} - {} com {} [{}]",
                    appt.id, appt.date, appt.professional, appt.status
                );
            }
        }
        AgendaCommands::Slots => {
            let doc = store.document();
            let date = doc.current_date.format("%Y-%m-%d").to_string();
            println!("Horários livres em {}:", date);
            let mut any = false;
            for slot in doc.available_slots.iter().filter(|s| s.date == date && s.available) {
                println!("  🕐 {}", slot.time);
                any = true;
            }
            if !any {
                println!("  (nenhum horário livre)");
            }
        }
        AgendaCommands::Prev => {
            let date = store.change_scheduling_date(DateDirection::Prev);
            store.flush()?;
            println!("📅 Agenda em {}", date.format("%d/%m/%Y"));
        }
        AgendaCommands::Next => {
            let date = store.change_scheduling_date(DateDirection::Next);
            store.flush()?;
            println!("📅 Agenda em {}", date.format("%d/%m/%Y"));
        }
    }
    Ok(())
}

fn handle_mensagem(store: &mut WellnessStore, command: MensagemCommands) -> Result<()> {
    match command {
        MensagemCommands::Add { de, texto } => {
            let message = store.add_message(&de, &texto)?;
            store.flush()?;
            println!("💬 Mensagem registrada (id {}).", message.id);
        }
        MensagemCommands::List => {
            if store.document().messages.is_empty() {
                println!("Nenhuma mensagem.");
                return Ok(());
            }
            for message in &store.document().messages {
                let mark = if message.read { " " } else { "•" };
                println!("{} 💬 {}: {}", mark, message.sender, message.content);
            }
            if store.mark_messages_read() > 0 {
                store.flush()?;
            }
        }
    }
    Ok(())
}

fn handle_avaliacao(store: &mut WellnessStore, command: AvaliacaoCommands) -> Result<()> {
    match command {
        AvaliacaoCommands::Add { nota, obs } => {
            let assessment = store.add_self_assessment(nota, obs)?;
            store.flush()?;
            println!("🧭 Autoavaliação registrada: {}/10", assessment.score);
        }
        AvaliacaoCommands::List => {
            let assessments = &store.document().self_assessments;
            if assessments.is_empty() {
                println!("Nenhuma autoavaliação ainda.");
            }
            for assessment in assessments {
                match &assessment.notes {
                    Some(notes) => {
                        println!("🧭 {} {}/10: {}", assessment.date, assessment.score, notes)
                    }
                    None => println!("🧭 {} {}/10", assessment.date, assessment.score),
                }
            }
        }
    }
    Ok(())
}

fn handle_stats(store: &WellnessStore) {
    let stats = store.statistics();
    let next = crate::store::xp_for_next_level(stats.level);
    println!("📊 Estatísticas");
    if let Some(name) = &store.document().user_name {
        println!("Usuário: {}", name);
    }
    println!("Nível: {} ({}/{} XP)", stats.level, stats.xp, next);
    println!("Sequência de check-ins: {} dia(s)", stats.check_in_streak);
    println!("Check-ins: {}", stats.check_ins);
    println!("Humor médio: {:.1}", stats.average_mood);
    println!("Metas: {}/{} concluídas", stats.completed_goals, stats.total_goals);
    println!("Entradas no diário: {}", stats.journal_entries);
    println!("Consultas: {}", stats.appointments);
    println!("Conquistas: {}", stats.badges);
}

fn handle_conquistas(store: &WellnessStore) {
    let earned = &store.document().profile.badges;
    if earned.is_empty() {
        println!("Nenhuma conquista ainda. Continue cuidando de você!");
        return;
    }
    println!("🏅 Conquistas ({}/{})", earned.len(), catalog::all_badges().len());
    for id in earned {
        let badge = catalog::badge(*id);
        println!("{} {}: {}", badge.icon, badge.title, badge.description);
    }
}

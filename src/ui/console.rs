//! Line-based console front end
//!
//! Reads one command per line, hands it to the world and redraws. The world
//! never touches the terminal; everything printed goes through here.

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};

use crate::combat::{describe_round, BattleAction, BattleInput, RoundReport};
use crate::data::GameConfig;
use crate::entities::{Enemy, Player};
use crate::game::{GameMessage, MessageCategory, SessionEnd, TurnOutcome, World};
use crate::save::{load_world, save_exists, save_world};
use crate::world::Direction;

/// Parse "x y" or "x,y" into inventory coordinates
pub fn parse_coords(line: &str) -> Option<(u8, u8)> {
    let mut parts = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty());
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((x, y))
}

/// A command typed on the map screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Inventory,
    Save,
    Pickup,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let mut chars = line.trim().chars();
        let key = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        if let Some(dir) = Direction::from_key(key) {
            return Some(Command::Move(dir));
        }
        match key.to_ascii_lowercase() {
            'i' => Some(Command::Inventory),
            'z' => Some(Command::Save),
            'p' => Some(Command::Pickup),
            'q' => Some(Command::Quit),
            _ => None,
        }
    }
}

/// Prompts for battle decisions on the same streams as the console
struct BattlePrompt<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
    error: Option<io::Error>,
}

impl<R: BufRead, W: Write> BattlePrompt<'_, R, W> {
    fn try_choose(&mut self, player: &Player, enemy: &Enemy) -> io::Result<BattleAction> {
        writeln!(self.output, "==== BATTLE ====")?;
        writeln!(
            self.output,
            "{}: {}/{} HP | ATK {} | DEF {}",
            player.name, player.health, player.max_health, player.attack, player.defense
        )?;
        writeln!(
            self.output,
            "{}: {} HP | ATK {} | DEF {}",
            enemy.name, enemy.health, enemy.attack, enemy.defense
        )?;

        loop {
            write!(self.output, "1. Attack  2. Flee\nChoose an action: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(BattleAction::Flee);
            }
            match line.trim() {
                "1" => return Ok(BattleAction::Attack),
                "2" => return Ok(BattleAction::Flee),
                _ => writeln!(self.output, "Unknown action. Try again.")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> BattleInput for BattlePrompt<'_, R, W> {
    fn choose_action(&mut self, player: &Player, enemy: &Enemy) -> BattleAction {
        if self.error.is_some() {
            return BattleAction::Flee;
        }
        match self.try_choose(player, enemy) {
            Ok(action) => action,
            Err(e) => {
                self.error = Some(e);
                BattleAction::Flee
            }
        }
    }

    fn round_resolved(&mut self, report: &RoundReport, _player: &Player, enemy: &Enemy) {
        if self.error.is_some() {
            return;
        }
        for line in describe_round(report, &enemy.name) {
            if let Err(e) = writeln!(self.output, "{}", line) {
                self.error = Some(e);
                return;
            }
        }
    }
}

/// Interactive session over any line reader and writer
pub struct ConsoleApp<R, W> {
    input: R,
    output: W,
    config: GameConfig,
    /// Messages from the last action, shown under the map
    log: Vec<GameMessage>,
}

impl<R: BufRead, W: Write> ConsoleApp<R, W> {
    pub fn new(input: R, output: W, config: GameConfig) -> Self {
        Self {
            input,
            output,
            config,
            log: Vec::new(),
        }
    }

    /// Show the main menu and play one session to its end
    pub fn run(&mut self) -> Result<SessionEnd> {
        let Some(mut world) = self.main_menu()? else {
            return Ok(SessionEnd::Quit);
        };
        let end = self.play(&mut world)?;
        self.announce_end(&end)?;
        Ok(end)
    }

    /// Read one line; `None` once input is exhausted
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        self.read_line()
    }

    fn pause(&self, ms: u64) {
        if ms > 0 {
            thread::sleep(Duration::from_millis(ms));
        }
    }

    fn main_menu(&mut self) -> Result<Option<World>> {
        writeln!(self.output, "==== GRID RPG ====")?;
        writeln!(self.output, "1. New game")?;
        writeln!(self.output, "2. Load game")?;
        let Some(choice) = self.prompt("Choose an option: ")? else {
            return Ok(None);
        };

        if choice == "2" {
            let path = self.config.save_path();
            if !save_exists(&path) {
                writeln!(self.output, "No saved game found. Starting a new one.")?;
            } else {
                match load_world(&path, self.config.clone()) {
                    Ok(world) => {
                        writeln!(self.output, "Game loaded.")?;
                        self.pause(self.config.delays.short_ms);
                        return Ok(Some(world));
                    }
                    Err(e) => {
                        log::warn!("Could not load {}: {}", path.display(), e);
                        writeln!(self.output, "Could not load the game ({}). Starting a new one.", e)?;
                    }
                }
            }
        } else if choice != "1" {
            writeln!(self.output, "Unknown option. Starting a new game.")?;
        }

        let Some(name) = self.prompt("Enter your name: ")? else {
            return Ok(None);
        };
        Ok(Some(World::new(&name, self.config.clone())))
    }

    fn draw(&mut self, world: &World) -> io::Result<()> {
        execute!(self.output, Clear(ClearType::All), MoveTo(0, 0))?;
        write!(self.output, "{}", world.map().render())?;
        writeln!(self.output, "{}", world.status())?;
        for message in &self.log {
            let prefix = match message.category {
                MessageCategory::Warning => "! ",
                _ => "",
            };
            writeln!(self.output, "{}{}", prefix, message.text)?;
        }
        Ok(())
    }

    /// Print what just happened and keep it for the next redraw
    fn show_messages(&mut self, world: &mut World) -> io::Result<()> {
        self.log = world.drain_messages();
        for message in &self.log {
            writeln!(self.output, "{}", message.text)?;
        }
        Ok(())
    }

    fn play(&mut self, world: &mut World) -> Result<SessionEnd> {
        self.show_messages(world)?;

        loop {
            self.draw(world)?;
            let Some(line) = self.prompt("Move (WASD), I - inventory, Z - save, P - pick up, Q - quit: ")? else {
                return Ok(SessionEnd::Quit);
            };

            let Some(command) = Command::parse(&line) else {
                self.log = vec![GameMessage {
                    text: format!("Unknown command: {}", line),
                    category: MessageCategory::Warning,
                }];
                continue;
            };

            match command {
                Command::Quit => return Ok(SessionEnd::Quit),
                Command::Inventory => {
                    self.inventory_menu(world)?;
                    self.log.clear();
                }
                Command::Save => {
                    let path = self.config.save_path();
                    match save_world(world, &path) {
                        Ok(()) => world.add_message("Game saved.", MessageCategory::System),
                        Err(e) => {
                            log::warn!("Save to {} failed: {}", path.display(), e);
                            world.add_message(format!("Save failed: {}", e), MessageCategory::Warning);
                        }
                    }
                    self.show_messages(world)?;
                    self.pause(self.config.delays.short_ms);
                }
                Command::Pickup => {
                    world.pickup();
                    self.show_messages(world)?;
                    self.pause(self.config.delays.short_ms);
                }
                Command::Move(direction) => {
                    let outcome = {
                        let mut prompt = BattlePrompt {
                            input: &mut self.input,
                            output: &mut self.output,
                            error: None,
                        };
                        let outcome = world.player_turn(direction, &mut prompt);
                        if let Some(e) = prompt.error {
                            return Err(e.into());
                        }
                        outcome
                    };

                    self.show_messages(world)?;
                    if world.take_pause_request() {
                        self.pause(self.config.delays.long_ms);
                    }

                    match outcome {
                        TurnOutcome::Continue => {}
                        TurnOutcome::LevelChanged { .. } => self.pause(self.config.delays.long_ms),
                        TurnOutcome::Ended(end) => return Ok(end),
                    }
                }
            }
        }
    }

    fn inventory_menu(&mut self, world: &mut World) -> Result<()> {
        loop {
            execute!(self.output, Clear(ClearType::All), MoveTo(0, 0))?;
            write!(self.output, "{}", world.player().inventory.render())?;
            for item in world.player().inventory.anchored_items() {
                if let Some(anchor) = item.anchor {
                    writeln!(
                        self.output,
                        "  [{}] {} at ({}, {}) {}",
                        item.symbol,
                        item.name,
                        anchor.x,
                        anchor.y,
                        item.bonus_summary()
                    )?;
                }
            }
            writeln!(self.output, "1. Move item")?;
            writeln!(self.output, "2. Use item")?;
            writeln!(self.output, "3. Back")?;

            let Some(choice) = self.prompt("Choose an option: ")? else {
                return Ok(());
            };

            match choice.as_str() {
                "1" => {
                    let Some(from) = self.prompt_coords("Item position (x y): ")? else {
                        continue;
                    };
                    let Some(to) = self.prompt_coords("New position (x y): ")? else {
                        continue;
                    };
                    match world.move_inventory_item(from, to) {
                        Ok(_) => writeln!(self.output, "Item moved.")?,
                        Err(e) => writeln!(self.output, "Cannot move item: {}", e)?,
                    }
                }
                "2" => {
                    let Some((x, y)) = self.prompt_coords("Item position (x y): ")? else {
                        continue;
                    };
                    match world.use_inventory_item(x, y) {
                        Ok(used) => writeln!(self.output, "Used {}.", used.name)?,
                        Err(e) => writeln!(self.output, "Cannot use item: {}", e)?,
                    }
                }
                "3" => return Ok(()),
                _ => writeln!(self.output, "Unknown option.")?,
            }
            world.drain_messages();
            self.pause(self.config.delays.short_ms);
        }
    }

    /// Ask for coordinates; `None` if the reply is not two numbers
    fn prompt_coords(&mut self, text: &str) -> io::Result<Option<(u8, u8)>> {
        let Some(line) = self.prompt(text)? else {
            return Ok(None);
        };
        let coords = parse_coords(&line);
        if coords.is_none() {
            writeln!(self.output, "Invalid coordinates: {}", line)?;
        }
        Ok(coords)
    }

    fn announce_end(&mut self, end: &SessionEnd) -> io::Result<()> {
        match end {
            SessionEnd::Victory { total_kills } => {
                writeln!(
                    self.output,
                    "Congratulations! You completed all levels with {} kills!",
                    total_kills
                )?;
                self.pause(self.config.delays.finale_ms);
            }
            SessionEnd::Defeat { cause } => {
                writeln!(self.output, "You have been defeated. {}. Game over.", cause)?;
                self.pause(self.config.delays.long_ms);
            }
            SessionEnd::Quit => writeln!(self.output, "Goodbye!")?,
        }
        self.output.flush()
    }

    /// Everything written so far
    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Delays;
    use std::io::Cursor;

    fn test_config() -> GameConfig {
        GameConfig {
            seed: Some(99),
            delays: Delays::none(),
            ..GameConfig::default()
        }
    }

    fn run_script(script: &str, config: GameConfig) -> (SessionEnd, String) {
        let mut app = ConsoleApp::new(Cursor::new(script.to_string()), Vec::new(), config);
        let end = app.run().unwrap();
        let output = String::from_utf8_lossy(&app.into_output()).into_owned();
        (end, output)
    }

    #[test]
    fn test_parse_coords() {
        assert_eq!(parse_coords("3 4"), Some((3, 4)));
        assert_eq!(parse_coords(" 0,9 "), Some((0, 9)));
        assert_eq!(parse_coords("3"), None);
        assert_eq!(parse_coords("a b"), None);
        assert_eq!(parse_coords("1 2 3"), None);
        assert_eq!(parse_coords("-1 2"), None);
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(Command::parse("w"), Some(Command::Move(Direction::Up)));
        assert_eq!(Command::parse("D"), Some(Command::Move(Direction::Right)));
        assert_eq!(Command::parse("I"), Some(Command::Inventory));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
        assert_eq!(Command::parse("x"), None);
        assert_eq!(Command::parse("wd"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn test_new_game_then_quit() {
        let (end, output) = run_script("1\nAla\nq\n", test_config());
        assert_eq!(end, SessionEnd::Quit);
        assert!(output.contains("Ala | Level 1 | HP 200/200"));
        assert!(output.contains("Goodbye!"));
    }

    #[test]
    fn test_unknown_command_reprompts() {
        let (end, output) = run_script("1\nAla\nx\nq\n", test_config());
        assert_eq!(end, SessionEnd::Quit);
        assert!(output.contains("Unknown command: x"));
    }

    #[test]
    fn test_end_of_input_quits() {
        let (end, _) = run_script("", test_config());
        assert_eq!(end, SessionEnd::Quit);
        let (end, _) = run_script("1\nAla\n", test_config());
        assert_eq!(end, SessionEnd::Quit);
    }

    #[test]
    fn test_failed_load_starts_new_game() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig {
            save_file: Some(dir.path().join("missing.dat")),
            ..test_config()
        };
        let (end, output) = run_script("2\nBob\nq\n", config);
        assert_eq!(end, SessionEnd::Quit);
        assert!(output.contains("No saved game found"));
        assert!(output.contains("Bob | Level 1"));
    }

    #[test]
    fn test_corrupt_save_starts_new_game() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.dat");
        std::fs::write(&path, b"GRPG\x01\0\0\0garbage").unwrap();
        let config = GameConfig {
            save_file: Some(path),
            ..test_config()
        };
        let (end, output) = run_script("2\nEve\nq\n", config);
        assert_eq!(end, SessionEnd::Quit);
        assert!(output.contains("Could not load the game"));
        assert!(output.contains("Eve | Level 1"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig {
            save_file: Some(dir.path().join("save.dat")),
            ..test_config()
        };

        let (_, output) = run_script("1\nCarol\nz\nq\n", config.clone());
        assert!(output.contains("Game saved."));
        assert!(dir.path().join("save.dat").exists());

        let (end, output) = run_script("2\nq\n", config);
        assert_eq!(end, SessionEnd::Quit);
        assert!(output.contains("Game loaded."));
        assert!(output.contains("Carol | Level 1"));
    }

    #[test]
    fn test_inventory_menu_round_trip() {
        let (end, output) = run_script("1\nDana\ni\n1\n0 0\n1 1\n2\nnope\n3\nq\n", test_config());
        assert_eq!(end, SessionEnd::Quit);
        assert!(output.contains("Inventory (10x10):"));
        assert!(output.contains("Cannot move item"));
        assert!(output.contains("Invalid coordinates: nope"));
    }
}

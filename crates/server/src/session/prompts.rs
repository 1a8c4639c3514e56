//! Prompt and message text for the move exchange.

/// Prepended to the very first move instruction of a session.
pub const OPENING_PROMPT: &str = "Let's play a game of chess. We would alternate between moves. I'm going to start as white and you will respond as black. Without further ado, my first move is:\n";

/// Occasionally appended to later instructions to keep replies well-formed.
pub const REMINDER_PROMPT: &str = "\n\nWhile responding with a move, keep in mind the following:\n- You play as black and I play as white.\n- You shall only respond with moves of the correct format. If you cannot respond with a move, you must respond with \"resign\" or \"end\".\n- You can always respond with \"resign\" or \"end\" if you want to end the game.\n- If an illegal move has been made, such as illegal castling or king capture, you must respond with your next move, as if the move was legal. You must never respond with \"illegal move\" or anything similar.\n";

/// Closing message when the human resigns.
pub const RESIGN_MESSAGE: &str = "Good game!";

/// Closing message when the human mates the opponent.
pub const CHECKMATE_MESSAGE: &str = "You beat me! Good game.";

/// Closing message when the human declares mate against themselves.
pub const SELF_CHECKMATE_MESSAGE: &str = "You have no moves left. I win!";

/// Closing message on a declared stalemate.
pub const STALEMATE_MESSAGE: &str = "Draw! Good game.";

#[cfg(test)]
pub mod test {
    use anyhow::Result;
    use proptest::prelude::*;

    use crate::{
        eval::DRAW_SCORE, Board, BoardError, Game, GameState, Mark, Minimax, MoveChoice,
        SearchConfig, TieBreak,
    };

    /// A full board with no alignment, reached by legal alternating play
    const DRAWN_GAME: &str = "643426421252361677317153414534371522655677";

    /// Positions from all stages of a game, none of them finished
    const POSITIONS: [&str; 6] = ["", "4", "4453", "334455", "12345671234567", "4444332"];

    /// Plays `moves` (0-indexed, taken modulo the width) until the game ends,
    /// skipping full columns. Returns the board and the side to move.
    fn random_position(moves: &[usize]) -> (Board, Mark) {
        let mut board = Board::new();
        let mut mark = Mark::PlayerOne;
        for &column in moves {
            if board.has_connect_four() || board.is_full() {
                break;
            }
            if board.drop(column % board.cols(), mark).is_ok() {
                mark = mark.opponent();
            }
        }
        (board, mark)
    }

    fn playing(board: &Board) -> bool {
        !board.has_connect_four() && !board.is_full()
    }

    #[test]
    pub fn drop_fills_from_the_bottom() {
        let mut board = Board::new();
        let rows: Vec<_> = (0..board.rows())
            .map(|_| board.drop(2, Mark::PlayerOne))
            .collect();
        assert_eq!(rows, vec![Ok(5), Ok(4), Ok(3), Ok(2), Ok(1), Ok(0)]);
        assert_eq!(board.height(2), 6);
    }

    #[test]
    pub fn full_column_is_rejected_without_change() -> Result<()> {
        let mut board = Board::from_moves("444444")?;
        let before = board.clone();

        assert_eq!(
            board.simulate_drop(3, Mark::PlayerOne),
            Err(BoardError::ColumnFull { column: 3 })
        );
        assert_eq!(
            board.drop(3, Mark::PlayerOne),
            Err(BoardError::ColumnFull { column: 3 })
        );
        assert_eq!(board, before);
        Ok(())
    }

    #[test]
    pub fn full_middle_column_is_not_legal() -> Result<()> {
        let board = Board::from_moves("444444")?;
        assert_eq!(board.legal_columns(), vec![0, 1, 2, 4, 5, 6]);
        assert_eq!(board.total_tokens(), 6);
        assert!(!board.has_connect_four());
        Ok(())
    }

    #[test]
    pub fn alignments_in_every_orientation() -> Result<()> {
        let horizontal = "
            .......
            .......
            .......
            .......
            .OOO...
            .XXXX..";
        let vertical = "
            .......
            .......
            ......O
            ..X...O
            ..XX..O
            .XXX..O";
        let down_right = "
            .......
            .......
            X......
            OX.....
            OOX....
            XOOX...";
        let down_left = "
            .......
            .......
            ......O
            .....OX
            ....OXX
            ...OXXX";
        for (diagram, winner) in [
            (horizontal, Mark::PlayerOne),
            (vertical, Mark::PlayerTwo),
            (down_right, Mark::PlayerOne),
            (down_left, Mark::PlayerTwo),
        ]
        .iter()
        {
            let board = Board::from_diagram(diagram)?;
            assert!(board.has_connect_four(), "no alignment found in\n{}", board);
            assert_eq!(board.winner(), Some(*winner));
        }
        Ok(())
    }

    #[test]
    pub fn broken_lines_are_not_alignments() -> Result<()> {
        let three_and_gap = "
            .......
            .......
            .......
            .......
            .......
            XXX.X..";
        let mixed = "
            .......
            .......
            ...X...
            ..XO...
            .XOO...
            OOXX...";
        for diagram in [three_and_gap, mixed].iter() {
            let board = Board::from_diagram(diagram)?;
            assert!(!board.has_connect_four(), "false alignment in\n{}", board);
        }
        Ok(())
    }

    #[test]
    pub fn agent_completes_its_own_line() -> Result<()> {
        // player two wins in column 4, nothing else wins at once
        let board = Board::from_diagram(
            "
            .......
            .......
            .......
            .......
            ....X..
            OOO.XX.",
        )?;
        for depth in 0..=4 {
            let mut minimax = Minimax::new(SearchConfig::default().with_depth(depth));
            assert_eq!(
                minimax.choose(&board, Mark::PlayerTwo),
                MoveChoice::Column(3),
                "depth {}",
                depth
            );
        }
        Ok(())
    }

    #[test]
    pub fn agent_blocks_the_opponent() -> Result<()> {
        // player one threatens column 5 on the bottom row
        let board = Board::from_moves("21374")?;
        let mut game = Game::from_moves("21374")?;
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.to_move(), Mark::PlayerTwo);

        let choice = Minimax::new(SearchConfig::default()).choose(&board, Mark::PlayerTwo);
        assert_eq!(choice, MoveChoice::Column(4));
        assert_eq!(game.play_checked(5)?, GameState::Playing);
        Ok(())
    }

    #[test]
    pub fn empty_board_choice_is_repeatable() {
        let board = Board::new();
        let mut minimax = Minimax::new(SearchConfig::default().with_depth(4));

        let first = minimax.choose(&board, Mark::PlayerTwo);
        let second = minimax.choose(&board, Mark::PlayerTwo);
        assert_eq!(first, second);
        match first {
            MoveChoice::Column(column) => assert!(column < board.cols()),
            MoveChoice::Draw { .. } => panic!("empty board reported as a draw"),
        }
    }

    #[test]
    pub fn full_board_reports_a_draw() -> Result<()> {
        let board = Board::from_moves(DRAWN_GAME)?;
        assert!(board.is_full());
        assert!(!board.has_connect_four());
        assert!(board.legal_columns().is_empty());

        let mut minimax = Minimax::new(SearchConfig::default());
        let report = minimax.analyse(&board, Mark::PlayerOne);
        let expected = DRAW_SCORE - board.total_tokens() as i32;
        assert_eq!(report.choice, MoveChoice::Draw { score: expected });
        assert_eq!(report.choice.column(), None);
        Ok(())
    }

    #[test]
    pub fn pruning_keeps_the_choice() -> Result<()> {
        for moves in POSITIONS.iter() {
            let board = Board::from_moves(moves)?;
            let agent = if moves.len() % 2 == 0 {
                Mark::PlayerOne
            } else {
                Mark::PlayerTwo
            };
            for depth in 1..=4 {
                let config = SearchConfig::default().with_depth(depth);
                let mut pruned = Minimax::new(config);
                let mut full = Minimax::new(config.with_pruning(false));

                let pruned_report = pruned.analyse(&board, agent);
                let full_report = full.analyse(&board, agent);
                assert_eq!(pruned_report.choice, full_report.choice, "{} depth {}", moves, depth);
                assert_eq!(pruned_report.score, full_report.score, "{} depth {}", moves, depth);
                assert!(pruned_report.nodes <= full_report.nodes);
            }
        }
        Ok(())
    }

    #[test]
    pub fn parallel_root_matches_sequential() -> Result<()> {
        for moves in POSITIONS.iter() {
            let board = Board::from_moves(moves)?;
            let config = SearchConfig::default().with_depth(3);
            let sequential = Minimax::new(config).analyse(&board, Mark::PlayerOne);
            let parallel = Minimax::new(config.with_parallel(true)).analyse(&board, Mark::PlayerOne);
            assert_eq!(sequential.choice, parallel.choice, "{}", moves);
            assert_eq!(sequential.score, parallel.score, "{}", moves);
        }
        Ok(())
    }

    #[test]
    pub fn seeded_tie_break_is_reproducible() -> Result<()> {
        let board = Board::from_moves("44")?;
        let config = SearchConfig::default()
            .with_depth(2)
            .with_tie_break(TieBreak::Seeded(42));

        let first = Minimax::new(config).analyse(&board, Mark::PlayerOne);
        let second = Minimax::new(config).analyse(&board, Mark::PlayerOne);
        assert_eq!(first, second);

        // the shuffled order only decides between equal scores
        let lowest = Minimax::new(config.with_tie_break(TieBreak::LowestColumn))
            .analyse(&board, Mark::PlayerOne);
        assert_eq!(first.score, lowest.score);
        Ok(())
    }

    #[test]
    pub fn game_reports_wins() -> Result<()> {
        let mut game = Game::from_moves("121212")?;
        assert_eq!(game.play_checked(1)?, GameState::PlayerOneWin);
        assert!(game.play_checked(2).is_err());
        assert_eq!(game.history(), "1212121");

        let game = Game::from_moves("12123242")?;
        assert_eq!(game.state(), GameState::PlayerTwoWin);
        Ok(())
    }

    #[test]
    pub fn game_reports_draw() -> Result<()> {
        let (opening, last) = DRAWN_GAME.split_at(DRAWN_GAME.len() - 1);
        let mut game = Game::from_moves(opening)?;
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.board().legal_columns().len(), 1);
        assert_eq!(game.play_checked(last.parse()?)?, GameState::Draw);
        Ok(())
    }

    #[test]
    pub fn game_rejects_bad_input() -> Result<()> {
        let mut game = Game::from_moves("444444")?;
        assert!(game.play_checked(0).is_err());
        assert!(game.play_checked(8).is_err());
        assert!(game.play_checked(4).is_err());
        // rejected moves do not change the turn
        assert_eq!(game.to_move(), Mark::PlayerOne);
        assert_eq!(game.history(), "444444");
        assert!(Game::from_moves("44a").is_err());
        Ok(())
    }

    #[test]
    pub fn custom_board_sizes() {
        let mut game = Game::with_size(4, 5);
        for _ in 0..4 {
            assert!(game.play_checked(5).is_ok());
        }
        assert_eq!(game.board().legal_columns(), vec![0, 1, 2, 3]);

        let board = Board::with_size(5, 9);
        let choice = Minimax::new(SearchConfig::default().with_depth(2))
            .choose(&board, Mark::PlayerOne);
        assert!(choice.column().map_or(false, |c| c < 9));
    }

    #[test]
    #[should_panic]
    pub fn game_rejects_ten_columns() {
        // "10" would be ambiguous in the move history
        Game::with_size(6, 10);
    }

    #[test]
    #[should_panic]
    pub fn empty_mark_cannot_search() {
        crate::select_move(&Board::new(), Mark::Empty);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn simulate_drop_changes_one_cell(moves in prop::collection::vec(0..7usize, 0..40), column in 0..7usize) {
            let (board, mark) = random_position(&moves);
            let before = board.clone();

            match board.simulate_drop(column, mark) {
                Ok(next) => {
                    let row = board.rows() - 1 - board.height(column);
                    prop_assert_eq!(next.get(row, column), mark);
                    prop_assert_eq!(next.total_tokens(), board.total_tokens() + 1);
                    for r in 0..board.rows() {
                        for c in 0..board.cols() {
                            if (r, c) != (row, column) {
                                prop_assert_eq!(next.get(r, c), board.get(r, c));
                            }
                        }
                    }
                }
                Err(err) => {
                    prop_assert_eq!(err, BoardError::ColumnFull { column });
                    prop_assert_eq!(board.height(column), board.rows());
                }
            }
            prop_assert_eq!(board, before);
        }

        #[test]
        fn legal_columns_are_the_open_tops(moves in prop::collection::vec(0..7usize, 0..60)) {
            let (board, _) = random_position(&moves);
            let legal = board.legal_columns();
            let full = (0..board.cols()).filter(|&c| !board.get(0, c).is_empty()).count();
            prop_assert_eq!(legal.len(), board.cols() - full);
            for column in 0..board.cols() {
                prop_assert_eq!(legal.contains(&column), board.get(0, column).is_empty());
            }
            prop_assert!(legal.windows(2).all(|pair| pair[0] < pair[1]));
        }

        #[test]
        fn chosen_column_is_legal(moves in prop::collection::vec(0..7usize, 0..40)) {
            let (board, mark) = random_position(&moves);
            prop_assume!(playing(&board));
            let choice = Minimax::new(SearchConfig::default().with_depth(2)).choose(&board, mark);
            match choice {
                MoveChoice::Column(column) => prop_assert!(board.legal_columns().contains(&column)),
                MoveChoice::Draw { .. } => prop_assert!(false, "draw reported with legal moves"),
            }
        }

        #[test]
        fn pruning_is_invisible(moves in prop::collection::vec(0..7usize, 0..30)) {
            let (board, mark) = random_position(&moves);
            prop_assume!(playing(&board));
            let config = SearchConfig::default().with_depth(3);
            let pruned = Minimax::new(config).analyse(&board, mark);
            let full = Minimax::new(config.with_pruning(false)).analyse(&board, mark);
            prop_assert_eq!(pruned.choice, full.choice);
            prop_assert_eq!(pruned.score, full.score);
        }
    }
}

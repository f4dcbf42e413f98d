use pgnfen::{
    moves::SanError, replay, Color, End, Error, File, GameResult, NumberPolicy, Position, Rank,
    ReplayOptions, Replayer, Square, Status,
};

const OPERA_GAME: &str = r#"[Event "Paris"]
[Site "Paris FRA"]
[Date "1858.??.??"]
[White "Paul Morphy"]
[Black "Duke Karl / Count Isouard"]
[Result "1-0"]

1. e4 e5 2. Nf3 d6 3. d4 Bg4 {This is a weak move already.} 4. dxe5 Bxf3 5. Qxf3
dxe5 6. Bc4 Nf6 7. Qb3 Qe7 8. Nc3 c6 9. Bg5 {Black is in what's like a zugzwang
position here.} b5 10. Nxb5! cxb5 11. Bxb5+ Nbd7 12. O-O-O Rd8 13. Rxd7 Rxd7
14. Rd1 Qe6 15. Bxd7+ (15. Qb8+ $2 Nxb8) Nxd7 16. Qb8+! Nxb8 17. Rd8# 1-0
"#;

const OPERA_SANS: [&str; 33] = [
    "e4", "e5", "Nf3", "d6", "d4", "Bg4", "dxe5", "Bxf3", "Qxf3", "dxe5", "Bc4", "Nf6", "Qb3",
    "Qe7", "Nc3", "c6", "Bg5", "b5", "Nxb5", "cxb5", "Bxb5+", "Nbd7", "O-O-O", "Rd8", "Rxd7",
    "Rxd7", "Rd1", "Qe6", "Bxd7+", "Nxd7", "Qb8+", "Nxb8", "Rd8#",
];

fn sq(file: File, rank: Rank) -> Square {
    Square::from_parts(file, rank)
}

#[test]
fn test_fools_mate() {
    let replay = replay("f3 e5 g4 Qh4#").unwrap();
    assert!(replay.is_complete());
    let sans = replay.game.sans();
    assert_eq!(sans.len(), 4);
    assert!(sans.last().unwrap().ends_with('#'));
    assert_eq!(replay.game.fens().len(), 5);
    assert!(!replay.game.last().has_legal_moves());
    assert_eq!(replay.game.last().side(), Color::White);
    assert_eq!(replay.game.status(), Status::Checkmate(Color::Black));
}

#[test]
fn test_opera_game() {
    let replay = replay(OPERA_GAME).unwrap();
    assert!(replay.is_complete());
    let game = replay.game;
    assert_eq!(game.sans(), OPERA_SANS);
    assert_eq!(game.fens().len(), OPERA_SANS.len() + 1);
    assert_eq!(game.status(), Status::Checkmate(Color::White));
    assert_eq!(game.result(), Some(GameResult::WhiteWins));
    assert_eq!(game.tags().get("White"), Some("Paul Morphy"));
    assert_eq!(game.tags().len(), 6);

    // Comments, variations, NAGs and tags don't change anything
    let bare = pgnfen::replay(&OPERA_SANS.join(" ")).unwrap();
    assert_eq!(bare.game.fens(), game.fens());
    assert_eq!(bare.game.sans(), game.sans());
    assert_eq!(bare.game.result(), None);

    // Re-emitted movetext replays into the same game
    let movetext = game.movetext(NumberPolicy::FromPosition);
    assert!(movetext.starts_with("1. e4 e5 2. Nf3 d6 3. d4 Bg4"));
    assert!(movetext.ends_with("16. Qb8+ Nxb8 17. Rd8#"));
    let again = pgnfen::replay(&movetext).unwrap();
    assert_eq!(again.game.fens(), game.fens());
}

#[test]
fn test_illegal_fifth_move() {
    let replay = replay("1. e4 e5 2. Nf3 Nc6 3. Ke3").unwrap();
    assert_eq!(replay.game.fens().len(), 5);
    assert_eq!(replay.game.sans().len(), 4);
    match &replay.end {
        End::Failed {
            index,
            token,
            error,
        } => {
            assert_eq!(*index, 4);
            assert_eq!(token, "Ke3");
            assert!(matches!(
                error,
                Error::AmbiguousOrUnknownMove {
                    source: SanError::NotFound,
                    ..
                }
            ));
            assert!(!error.is_engine_defect());
        }
        End::Complete => panic!("replay must fail"),
    }
}

#[test]
fn test_ambiguous() {
    let replay = replay("1. d4 d5 2. Nd2 Nf6 3. Nf3").unwrap();
    assert!(matches!(
        replay.end,
        End::Failed {
            index: 4,
            error: Error::AmbiguousOrUnknownMove {
                source: SanError::Ambiguous(_, _),
                ..
            },
            ..
        }
    ));

    let replay = pgnfen::replay("1. d4 d5 2. Nd2 Nf6 3. Ngf3 Nbd7 4. Nb3").unwrap();
    assert!(replay.is_complete());
    assert_eq!(
        replay.game.sans(),
        vec!["d4", "d5", "Nd2", "Nf6", "Ngf3", "Nbd7", "Nb3"]
    );
}

#[test]
fn test_castling_monotonic() {
    let replay = replay(
        "1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. O-O Nf6 5. Re1 Rg8 6. Rf1 Rh8 7. d3 Ke7",
    )
    .unwrap();
    assert!(replay.is_complete());
    let game = &replay.game;
    let mut prev = game.initial().castling();
    for ply in game.plies() {
        let cur = ply.position.castling();
        assert!(cur.is_subset_of(prev));
        prev = cur;
    }
    assert_eq!(
        game.fens()[7],
        "r1bqk1nr/pppp1ppp/2n5/2b1p3/2B1P3/5N2/PPPP1PPP/RNBQ1RK1 b kq - 5 4"
    );
    assert!(game.plies()[9].position.as_fen().contains(" w q - "));
    assert!(game.last().as_fen().contains(" w - - "));
}

#[test]
fn test_enpassant_window() {
    let replay = replay("1. e4 Nf6 2. e5 d5 3. exd6").unwrap();
    assert!(replay.is_complete());
    let plies = replay.game.plies();
    assert_eq!(plies[3].position.ep_target(), Some(sq(File::D, Rank::R6)));
    assert!(plies[4].mv.is_en_passant());
    assert_eq!(plies[4].position.ep_target(), None);
    assert_eq!(plies[4].position.get(sq(File::D, Rank::R5)), None);
    assert_eq!(replay.game.sans()[4], "exd6");

    let replay = pgnfen::replay("1. e4 Nf6 2. e5 d5 3. Nf3 Nc6 4. exd6").unwrap();
    assert!(matches!(
        replay.end,
        End::Failed {
            index: 6,
            error: Error::AmbiguousOrUnknownMove {
                source: SanError::CaptureExpected,
                ..
            },
            ..
        }
    ));
}

#[test]
fn test_promotion() {
    let options = ReplayOptions {
        initial: Some(Position::from_fen("7k/P7/8/8/8/8/8/K7 w - - 0 1").unwrap()),
        ..ReplayOptions::default()
    };
    let replayer = Replayer::with_options(options);
    let game = replayer
        .replay("1. a8=Q+ Kh7 2. Qb7+")
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(game.sans(), vec!["a8=Q+", "Kh7", "Qb7+"]);

    let replay = replayer.replay("1. a8").unwrap();
    assert!(matches!(
        replay.end,
        End::Failed {
            index: 0,
            error: Error::MissingPromotion { .. },
            ..
        }
    ));
}

#[test]
fn test_fen_tag() {
    let src = r#"[SetUp "1"]
[FEN "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1"]

1. O-O O-O-O 2. Rf7"#;
    let game = replay(src).unwrap().into_result().unwrap();
    assert_eq!(game.sans(), vec!["O-O", "O-O-O", "Rf7"]);
    assert_eq!(
        game.fens(),
        vec![
            "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
            "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1",
            "2kr3r/8/8/8/8/8/8/R4RK1 w - - 2 2",
            "2kr3r/5R2/8/8/8/8/8/R5K1 b - - 3 2",
        ]
    );

    assert!(matches!(
        pgnfen::replay("[FEN \"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq\"]\n1. e4"),
        Err(Error::MalformedPosition(_))
    ));
}

#[test]
fn test_empty_movetext() {
    assert_eq!(pgnfen::replay("").unwrap_err(), Error::EmptyMovetext);
    assert_eq!(
        pgnfen::replay("[Event \"?\"]\n\n*").unwrap_err(),
        Error::EmptyMovetext
    );
}

#[test]
fn test_record() {
    let replay = replay("1. e4 e5").unwrap();
    let record = replay.record();
    assert_eq!(
        record.fens,
        vec![
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2",
        ]
    );
    assert_eq!(record.moves, vec!["e4", "e5"]);
}

#[test]
fn test_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Position>();
    assert_send_sync::<pgnfen::Replay>();

    let handles: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(|| replay(OPERA_GAME).unwrap().game.fens()))
        .collect();
    let fens: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(fens.windows(2).all(|w| w[0] == w[1]));
}

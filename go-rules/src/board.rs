use std::collections::HashMap;
use std::fmt;

use arrayvec::ArrayVec;

use crate::error::GoError;
use crate::player::Player;
use crate::point::Point;
use crate::zobrist::{self, MAX_BOARD_SIZE};

/// A maximal 4-connected set of same-colored stones and its liberties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub player: Player,
    pub stones: Vec<Point>,
    pub liberties: Vec<Point>,
}

impl Group {
    pub fn num_liberties(&self) -> usize {
        self.liberties.len()
    }
}

/// Square Go board stored as a flat row-major array of cells
/// (`1` black, `-1` white, `0` empty).
///
/// Groups and liberties are not stored; they are recomputed by flood fill
/// whenever asked for. The board keeps a Zobrist hash of its occupancy in
/// step with every placement and removal.
#[derive(Debug, Clone)]
pub struct Board {
    cells: Vec<i8>,
    size: u8,
    hash: u64,
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.cells == other.cells
    }
}

impl Eq for Board {}

impl Board {
    /// Create an empty `size` x `size` board.
    pub fn new(size: u8) -> Self {
        assert!(
            (1..=MAX_BOARD_SIZE).contains(&size),
            "board size must be between 1 and {MAX_BOARD_SIZE}, got {size}"
        );
        Board {
            cells: vec![0; size as usize * size as usize],
            size,
            hash: 0,
        }
    }

    /// Build a board from a square matrix of cell values, one inner vec per row.
    pub fn from_rows(rows: Vec<Vec<i8>>) -> Self {
        let size = rows.len() as u8;
        assert!(
            rows.iter().all(|row| row.len() == rows.len()),
            "malformed board matrix"
        );

        let mut board = Board::new(size);
        for (r, row) in rows.into_iter().enumerate() {
            for (c, v) in row.into_iter().enumerate() {
                if let Some(player) = Player::from_cell(v) {
                    board.set(Point::new(r as u8, c as u8), player);
                }
            }
        }
        board
    }

    // -- Accessors --

    pub fn size(&self) -> u8 {
        self.size
    }

    /// Row-major cell values.
    pub fn cells(&self) -> &[i8] {
        &self.cells
    }

    pub fn zobrist_hash(&self) -> u64 {
        self.hash
    }

    pub fn is_on_grid(&self, point: Point) -> bool {
        point.row < self.size && point.col < self.size
    }

    pub fn get(&self, point: Point) -> Option<Player> {
        if self.is_on_grid(point) {
            Player::from_cell(self.cells[self.idx(point)])
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&c| c == 0)
    }

    pub fn stone_count(&self, player: Player) -> usize {
        self.cells.iter().filter(|&&c| c == player.cell()).count()
    }

    /// Snapshot of every occupied point.
    pub fn occupancy(&self) -> HashMap<Point, Player> {
        self.points()
            .filter_map(|p| self.get(p).map(|player| (p, player)))
            .collect()
    }

    /// All points of the grid in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> + use<> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| Point::new(row, col)))
    }

    /// Same stones on the same points. Compares hashes first.
    pub fn same_position(&self, other: &Board) -> bool {
        self.hash == other.hash && self == other
    }

    // -- Mutation --

    /// Place a stone and remove every adjacent opposing group left without
    /// liberties. Returns the captured points in row-major order.
    ///
    /// Self-capture is not rejected here: a stone that ends up with no
    /// liberties stays on the board.
    pub fn place_stone(&mut self, point: Point, player: Player) -> Result<Vec<Point>, GoError> {
        if !self.is_on_grid(point) {
            return Err(GoError::OutOfBounds);
        }
        if self.get(point).is_some() {
            return Err(GoError::Occupied);
        }

        self.set(point, player);

        let mut captured: Vec<Point> = self
            .opponent_neighbor_groups(point, player)
            .into_iter()
            .filter(|g| g.liberties.is_empty())
            .flat_map(|g| g.stones)
            .collect();
        captured.sort();

        self.remove_group(&captured);
        Ok(captured)
    }

    /// Clear the given points. Off-grid and empty points are skipped.
    pub fn remove_group(&mut self, points: &[Point]) {
        for &p in points {
            self.clear(p);
        }
    }

    // -- Graph queries --

    /// The 4-connected neighbors that are on the board.
    pub fn neighbors(&self, point: Point) -> ArrayVec<Point, 4> {
        let Point { row, col } = point;
        let mut result = ArrayVec::new();
        if row > 0 {
            result.push(Point::new(row - 1, col));
        }
        if row + 1 < self.size {
            result.push(Point::new(row + 1, col));
        }
        if col > 0 {
            result.push(Point::new(row, col - 1));
        }
        if col + 1 < self.size {
            result.push(Point::new(row, col + 1));
        }
        result
    }

    /// The group containing `point`, or `None` if the point is empty or off the board.
    pub fn group(&self, point: Point) -> Option<Group> {
        let player = self.get(point)?;
        let mut visited = vec![false; self.cells.len()];
        let stones = self.chain_from(point, player, &mut visited);
        let liberties = self.chain_liberties(&stones);
        Some(Group {
            player,
            stones,
            liberties,
        })
    }

    /// Liberty count of the group containing `point`.
    pub fn liberties(&self, point: Point) -> Result<usize, GoError> {
        if !self.is_on_grid(point) {
            return Err(GoError::OutOfBounds);
        }
        self.group(point)
            .map(|g| g.num_liberties())
            .ok_or(GoError::NotFound)
    }

    /// Would a `player` stone at the empty `point` have no liberties, before
    /// any captures are taken into account?
    pub fn is_self_capture(&self, player: Player, point: Point) -> bool {
        if !self.is_on_grid(point) || self.get(point).is_some() {
            return false;
        }

        let mut friendly = Vec::new();
        for n in self.neighbors(point) {
            match self.get(n) {
                None => return false,
                Some(p) if p == player => friendly.push(n),
                Some(_) => {}
            }
        }

        // `point` itself is a liberty of every adjacent friendly group, so
        // the merged group survives only if one of them has another.
        friendly
            .into_iter()
            .filter_map(|n| self.group(n))
            .all(|g| g.num_liberties() == 1)
    }

    /// Would a `player` stone at the empty `point` take the last liberty of
    /// some opposing group?
    pub fn will_capture(&self, player: Player, point: Point) -> bool {
        !self.capture_candidates(player, point).is_empty()
    }

    /// Opposing stones a `player` stone at the empty `point` would remove.
    pub(crate) fn capture_candidates(&self, player: Player, point: Point) -> Vec<Point> {
        if !self.is_on_grid(point) || self.get(point).is_some() {
            return Vec::new();
        }
        self.opponent_neighbor_groups(point, player)
            .into_iter()
            .filter(|g| g.liberties == [point])
            .flat_map(|g| g.stones)
            .collect()
    }

    /// Hash the board would have after `player` plays the empty `point`
    /// and `captured` are removed.
    pub(crate) fn hash_after(&self, player: Player, point: Point, captured: &[Point]) -> u64 {
        let opponent = player.other();
        captured.iter().fold(
            self.hash ^ zobrist::key(self.idx(point), player),
            |h, &p| h ^ zobrist::key(self.idx(p), opponent),
        )
    }

    /// Distinct opposing groups touching `point`, from `player`'s side.
    fn opponent_neighbor_groups(&self, point: Point, player: Player) -> Vec<Group> {
        let opponent = player.other();
        let mut visited = vec![false; self.cells.len()];
        let mut groups = Vec::new();

        for n in self.neighbors(point) {
            if self.get(n) != Some(opponent) || visited[self.idx(n)] {
                continue;
            }
            let stones = self.chain_from(n, opponent, &mut visited);
            let liberties = self.chain_liberties(&stones);
            groups.push(Group {
                player: opponent,
                stones,
                liberties,
            });
        }

        groups
    }

    /// Flood-fill same-colored stones from `point` using a shared visited set.
    fn chain_from(&self, point: Point, player: Player, visited: &mut [bool]) -> Vec<Point> {
        let mut result = Vec::new();
        let mut stack = vec![point];

        while let Some(p) = stack.pop() {
            let vi = self.idx(p);
            if visited[vi] {
                continue;
            }
            visited[vi] = true;
            result.push(p);
            for n in self.neighbors(p) {
                if self.get(n) == Some(player) && !visited[self.idx(n)] {
                    stack.push(n);
                }
            }
        }

        result
    }

    fn chain_liberties(&self, chain: &[Point]) -> Vec<Point> {
        let mut seen = vec![false; self.cells.len()];
        let mut libs = Vec::new();
        for &p in chain {
            for n in self.neighbors(p) {
                let ni = self.idx(n);
                if !seen[ni] && self.get(n).is_none() {
                    seen[ni] = true;
                    libs.push(n);
                }
            }
        }
        libs
    }

    // -- Internal helpers --

    #[inline]
    fn idx(&self, point: Point) -> usize {
        point.row as usize * self.size as usize + point.col as usize
    }

    fn set(&mut self, point: Point, player: Player) {
        let i = self.idx(point);
        if let Some(old) = Player::from_cell(self.cells[i]) {
            self.hash ^= zobrist::key(i, old);
        }
        self.cells[i] = player.cell();
        self.hash ^= zobrist::key(i, player);
    }

    fn clear(&mut self, point: Point) {
        if !self.is_on_grid(point) {
            return;
        }
        let i = self.idx(point);
        if let Some(old) = Player::from_cell(self.cells[i]) {
            self.hash ^= zobrist::key(i, old);
            self.cells[i] = 0;
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            for col in 0..self.size {
                let c = match self.get(Point::new(row, col)) {
                    Some(Player::Black) => 'X',
                    Some(Player::White) => 'O',
                    None => '.',
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

//! LZP slot state machine.
//!
//! Every LZP hash slot carries an 8-bit state summarizing how its recent
//! predictions went. The state is advanced through a fixed transition table
//! after each coded byte and, together with a short match history, selects
//! the SEE probability used to code the next match flag.
//!
//! The table is part of the stream format: both sides must use exactly these
//! transitions.

/// Number of FSM states.
pub const NUM_STATES: usize = 256;

/// State every LZP slot starts in.
pub const SENTINEL_STATE: u8 = 0xFF;

/// Transition table indexed by `[state][matched as usize]`.
///
/// Column 0 is the next state after a misprediction, column 1 after a
/// correct prediction. The sentinel row sends both outcomes to state 0.
#[rustfmt::skip]
pub static STATE_TABLE: [[u8; 2]; NUM_STATES] = [
    [1, 241], [2, 227], [3, 213], [4, 202], [5, 45], [6, 23], [7, 23], [8, 23],
    [9, 23], [10, 23], [11, 23], [12, 23], [13, 23], [14, 23], [15, 42], [16, 42],
    [17, 42], [18, 42], [19, 42], [20, 42], [20, 21], [22, 44], [8, 23], [24, 25],
    [6, 23], [26, 46], [27, 45], [28, 45], [29, 45], [30, 45], [31, 23], [32, 23],
    [33, 23], [34, 23], [35, 23], [36, 42], [37, 42], [38, 42], [39, 42], [40, 42],
    [41, 42], [41, 21], [43, 44], [7, 23], [24, 25], [26, 46], [47, 66], [48, 65],
    [49, 65], [50, 45], [51, 45], [52, 45], [53, 45], [54, 45], [55, 45], [56, 45],
    [57, 63], [58, 63], [59, 42], [60, 42], [61, 42], [62, 42], [62, 21], [64, 25],
    [28, 45], [47, 66], [67, 86], [68, 85], [69, 65], [70, 65], [71, 65], [72, 45],
    [73, 45], [74, 45], [75, 45], [76, 45], [77, 63], [78, 63], [79, 63], [80, 63],
    [81, 63], [82, 63], [82, 83], [84, 25], [29, 45], [67, 86], [87, 103], [88, 102],
    [89, 85], [90, 65], [91, 65], [92, 65], [93, 65], [94, 65], [95, 45], [96, 45],
    [97, 63], [98, 63], [99, 63], [100, 63], [101, 63], [101, 83], [87, 103], [104, 107],
    [105, 106], [88, 102], [104, 107], [108, 189], [109, 110], [105, 106], [108, 111], [112, 173],
    [113, 114], [109, 110], [112, 115], [112, 116], [117, 158], [118, 119], [113, 114], [117, 120],
    [117, 121], [117, 122], [117, 123], [124, 147], [125, 126], [118, 119], [124, 127], [124, 128],
    [124, 129], [124, 130], [124, 131], [124, 132], [124, 133], [124, 134], [124, 135], [136, 139],
    [137, 138], [125, 126], [124, 128], [136, 140], [136, 141], [136, 142], [136, 143], [136, 144],
    [145, 144], [137, 146], [124, 129], [124, 148], [124, 149], [124, 150], [124, 151], [136, 152],
    [136, 153], [136, 154], [136, 155], [136, 156], [136, 157], [145, 157], [117, 159], [117, 160],
    [117, 161], [117, 162], [117, 163], [117, 164], [165, 167], [125, 166], [117, 121], [165, 168],
    [136, 169], [136, 170], [136, 171], [136, 172], [145, 172], [112, 174], [112, 175], [117, 176],
    [117, 177], [117, 178], [117, 179], [117, 180], [165, 181], [165, 182], [165, 183], [165, 184],
    [165, 185], [165, 186], [187, 186], [125, 188], [117, 122], [112, 190], [112, 191], [112, 192],
    [112, 193], [112, 194], [117, 195], [117, 196], [165, 197], [165, 198], [165, 199], [165, 200],
    [165, 201], [187, 201], [203, 205], [204, 65], [27, 45], [206, 208], [207, 85], [48, 65],
    [209, 211], [210, 102], [68, 85], [104, 212], [108, 111], [214, 217], [215, 216], [204, 65],
    [206, 208], [218, 221], [219, 220], [207, 85], [209, 211], [222, 225], [223, 224], [210, 102],
    [104, 212], [108, 226], [112, 115], [228, 231], [229, 230], [215, 216], [218, 221], [232, 235],
    [233, 234], [219, 220], [222, 225], [236, 239], [237, 238], [223, 224], [108, 226], [112, 240],
    [117, 120], [242, 245], [243, 244], [229, 230], [232, 235], [246, 249], [247, 248], [233, 234],
    [236, 239], [250, 253], [251, 252], [237, 238], [112, 240], [117, 254], [124, 127], [0, 0],
];

/// Next state after observing `matched` in `state`.
#[inline]
pub fn next_state(state: u8, matched: bool) -> u8 {
    STATE_TABLE[state as usize][usize::from(matched)]
}
